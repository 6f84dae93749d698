use crate::{
    context::{FilterContext, QueryContext},
    error::{CompileError, Result},
    fold::fold_constant,
    lower::{expression, materialized},
    mangle::mangle,
    resolver::{is_attribute_access, resolve_attribute_path, AttributePath},
};
use model::{
    core::value::{Value, ValueKind},
    filter::{
        node::{Bound, FilterNode, SearchRange},
        term::{GranularTerms, Term},
    },
};
use search_syntax::ast::{
    expr::{Expression, ExpressionKind},
    operator::BinaryOperator,
};

/// A comparison rewritten so the attribute access is on the left.
struct NormalizedCmp<'a> {
    attribute: &'a Expression,
    value: &'a Expression,
    operator: BinaryOperator,
}

fn normalize_cmp<'a>(
    ctx: &QueryContext,
    operator: BinaryOperator,
    left: &'a Expression,
    right: &'a Expression,
) -> Option<NormalizedCmp<'a>> {
    if is_attribute_access(left, ctx.doc_var)
        && right.is_deterministic()
        && !right.references(ctx.doc_var)
    {
        return Some(NormalizedCmp {
            attribute: left,
            value: right,
            operator,
        });
    }
    if is_attribute_access(right, ctx.doc_var)
        && left.is_deterministic()
        && !left.references(ctx.doc_var)
    {
        if let Some(mirrored) = operator.mirrored() {
            return Some(NormalizedCmp {
                attribute: right,
                value: left,
                operator: mirrored,
            });
        }
    }
    None
}

/// `==` and `!=` against a constant scalar.
pub(crate) fn from_binary_eq(
    ctx: &QueryContext,
    fctx: &FilterContext,
    operator: BinaryOperator,
    left: &Expression,
    right: &Expression,
    node: &Expression,
) -> Result<Option<FilterNode>> {
    let Some(cmp) = normalize_cmp(ctx, operator, left, right) else {
        return expression::from_expression(ctx, fctx, node);
    };
    reject_compound_literal(cmp.value)?;
    let Some(value) = fold_constant(ctx, cmp.value) else {
        return expression::from_expression(ctx, fctx, node);
    };
    // an unresolvable offset inside the path defers the whole leaf
    let Ok(path) = resolve_attribute_path(cmp.attribute, ctx) else {
        return expression::from_expression(ctx, fctx, node);
    };
    let term = term_node(fctx, &path, &value)?;
    Ok(materialized(ctx, move || {
        if cmp.operator == BinaryOperator::NotEqual {
            FilterNode::Not(Box::new(term))
        } else {
            term
        }
    }))
}

/// `<`, `<=`, `>`, `>=` against a constant scalar.
pub(crate) fn from_interval(
    ctx: &QueryContext,
    fctx: &FilterContext,
    operator: BinaryOperator,
    left: &Expression,
    right: &Expression,
    node: &Expression,
) -> Result<Option<FilterNode>> {
    // a chained relational comparison (a < b < c) is malformed, never a
    // fallback candidate
    for side in [left, right] {
        if let ExpressionKind::Binary { operator: op, .. } = &side.kind {
            if op.is_relational() {
                return Err(CompileError::UnsupportedShape(
                    "chained relational comparison".to_string(),
                ));
            }
        }
    }
    let Some(cmp) = normalize_cmp(ctx, operator, left, right) else {
        return expression::from_expression(ctx, fctx, node);
    };
    reject_compound_literal(cmp.value)?;
    let Some(value) = fold_constant(ctx, cmp.value) else {
        return expression::from_expression(ctx, fctx, node);
    };
    let Ok(path) = resolve_attribute_path(cmp.attribute, ctx) else {
        return expression::from_expression(ctx, fctx, node);
    };
    let min = matches!(
        cmp.operator,
        BinaryOperator::GreaterThan | BinaryOperator::GreaterOrEqual
    );
    let inclusive = matches!(
        cmp.operator,
        BinaryOperator::GreaterOrEqual | BinaryOperator::LessOrEqual
    );
    let range = half_range_node(fctx, &path, &value, min, inclusive)?;
    Ok(materialized(ctx, move || range))
}

/// `in` and `not in` against arrays and ranges.
pub(crate) fn from_in(
    ctx: &QueryContext,
    fctx: &FilterContext,
    operator: BinaryOperator,
    left: &Expression,
    right: &Expression,
    node: &Expression,
) -> Result<Option<FilterNode>> {
    if let ExpressionKind::Array(items) = &right.kind {
        return from_in_array(ctx, fctx, operator, left, items, node);
    }
    if let ExpressionKind::Range { low, high } = &right.kind {
        return from_in_range(ctx, fctx, operator, left, low, high, node);
    }
    reject_bare_document(ctx, left)?;
    if !is_attribute_access(left, ctx.doc_var)
        || !right.is_deterministic()
        || right.references(ctx.doc_var)
    {
        return expression::from_expression(ctx, fctx, node);
    }
    let Some(value) = fold_constant(ctx, right) else {
        return expression::from_expression(ctx, fctx, node);
    };
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(materialized(ctx, || empty_set_filter(operator)));
            }
            let Ok(path) = resolve_attribute_path(left, ctx) else {
                return expression::from_expression(ctx, fctx, node);
            };
            let mut terms = Vec::with_capacity(items.len());
            for item in &items {
                // a compound element defers the whole membership test
                if item.kind().is_none() {
                    return expression::from_expression(ctx, fctx, node);
                }
                terms.push(term_node(fctx, &path, item)?);
            }
            Ok(materialized(ctx, move || membership_filter(operator, terms)))
        }
        Value::Range(lo, hi) => {
            let Ok(path) = resolve_attribute_path(left, ctx) else {
                return expression::from_expression(ctx, fctx, node);
            };
            let range = full_range_node(fctx, &path, &Value::Int(lo), &Value::Int(hi))?;
            Ok(materialized(ctx, move || interval_filter(operator, range)))
        }
        other => Err(CompileError::UnsupportedShape(format!(
            "'in' expects an array or range, got {other}"
        ))),
    }
}

fn from_in_array(
    ctx: &QueryContext,
    fctx: &FilterContext,
    operator: BinaryOperator,
    left: &Expression,
    items: &[Expression],
    node: &Expression,
) -> Result<Option<FilterNode>> {
    reject_bare_document(ctx, left)?;
    if !is_attribute_access(left, ctx.doc_var) {
        return expression::from_expression(ctx, fctx, node);
    }
    if items.is_empty() {
        return Ok(materialized(ctx, || empty_set_filter(operator)));
    }
    let Ok(path) = resolve_attribute_path(left, ctx) else {
        return expression::from_expression(ctx, fctx, node);
    };
    let mut terms = Vec::with_capacity(items.len());
    for item in items {
        // an unfoldable or compound element defers the whole membership test
        let Some(value) = fold_constant(ctx, item) else {
            return expression::from_expression(ctx, fctx, node);
        };
        if value.kind().is_none() {
            return expression::from_expression(ctx, fctx, node);
        }
        terms.push(term_node(fctx, &path, &value)?);
    }
    Ok(materialized(ctx, move || membership_filter(operator, terms)))
}

fn from_in_range(
    ctx: &QueryContext,
    fctx: &FilterContext,
    operator: BinaryOperator,
    left: &Expression,
    low: &Expression,
    high: &Expression,
    node: &Expression,
) -> Result<Option<FilterNode>> {
    reject_bare_document(ctx, left)?;
    if !is_attribute_access(left, ctx.doc_var) {
        return expression::from_expression(ctx, fctx, node);
    }
    let (Some(lo), Some(hi)) = (fold_constant(ctx, low), fold_constant(ctx, high)) else {
        return expression::from_expression(ctx, fctx, node);
    };
    let Ok(path) = resolve_attribute_path(left, ctx) else {
        return expression::from_expression(ctx, fctx, node);
    };
    let range = full_range_node(fctx, &path, &lo, &hi)?;
    Ok(materialized(ctx, move || interval_filter(operator, range)))
}

fn membership_filter(operator: BinaryOperator, terms: Vec<FilterNode>) -> FilterNode {
    if operator == BinaryOperator::NotIn {
        FilterNode::Not(Box::new(FilterNode::And(terms)))
    } else {
        FilterNode::Or(terms)
    }
}

fn interval_filter(operator: BinaryOperator, range: FilterNode) -> FilterNode {
    if operator == BinaryOperator::NotIn {
        FilterNode::Not(Box::new(FilterNode::Or(vec![range])))
    } else {
        range
    }
}

fn empty_set_filter(operator: BinaryOperator) -> FilterNode {
    // nothing is in the empty set, everything is not in it
    if operator == BinaryOperator::NotIn {
        FilterNode::All
    } else {
        FilterNode::Empty
    }
}

fn reject_bare_document(ctx: &QueryContext, expr: &Expression) -> Result<()> {
    if matches!(&expr.kind, ExpressionKind::Variable(v) if v == ctx.doc_var) {
        return Err(CompileError::UnsupportedShape(format!(
            "'{}' itself has no attribute path to test membership on",
            ctx.doc_var
        )));
    }
    Ok(())
}

fn reject_compound_literal(expr: &Expression) -> Result<()> {
    if matches!(
        &expr.kind,
        ExpressionKind::Array(_) | ExpressionKind::Object(_) | ExpressionKind::Range { .. }
    ) {
        return Err(CompileError::UnsupportedShape(
            "comparison against a compound literal".to_string(),
        ));
    }
    Ok(())
}

/// Term filter for one constant scalar, mangled by its kind.
pub(crate) fn term_node(
    fctx: &FilterContext,
    path: &AttributePath,
    value: &Value,
) -> Result<FilterNode> {
    let (kind, term) = match value {
        Value::Null => (ValueKind::Null, Term::null()),
        Value::Boolean(b) => (ValueKind::Bool, Term::boolean(*b)),
        Value::Int(n) => (
            ValueKind::Numeric,
            GranularTerms::of(*n as f64).most_precise().clone(),
        ),
        Value::Float(n) => (
            ValueKind::Numeric,
            GranularTerms::of(*n).most_precise().clone(),
        ),
        Value::String(s) => (ValueKind::String, Term::string(s)),
        other => {
            return Err(CompileError::UnsupportedShape(format!(
                "expected a scalar comparison value, got {other}"
            )))
        }
    };
    Ok(FilterNode::Term {
        field: mangle(path, kind, &fctx.analyzer),
        term,
        boost: fctx.boost,
    })
}

/// Range filter with a single bound, for the relational operators.
fn half_range_node(
    fctx: &FilterContext,
    path: &AttributePath,
    value: &Value,
    min: bool,
    inclusive: bool,
) -> Result<FilterNode> {
    let field = |kind| mangle(path, kind, &fctx.analyzer);
    let node = match value {
        Value::Int(_) | Value::Float(_) => {
            let bound = Bound {
                value: GranularTerms::of(numeric_of(value)),
                inclusive,
            };
            FilterNode::GranularRange {
                field: field(ValueKind::Numeric),
                range: half_range(bound, min),
                boost: fctx.boost,
            }
        }
        Value::Null => FilterNode::Range {
            field: field(ValueKind::Null),
            range: half_range(
                Bound {
                    value: Term::null(),
                    inclusive,
                },
                min,
            ),
            boost: fctx.boost,
        },
        Value::Boolean(b) => FilterNode::Range {
            field: field(ValueKind::Bool),
            range: half_range(
                Bound {
                    value: Term::boolean(*b),
                    inclusive,
                },
                min,
            ),
            boost: fctx.boost,
        },
        Value::String(s) => FilterNode::Range {
            field: field(ValueKind::String),
            range: half_range(
                Bound {
                    value: Term::string(s),
                    inclusive,
                },
                min,
            ),
            boost: fctx.boost,
        },
        other => {
            return Err(CompileError::UnsupportedShape(format!(
                "expected a scalar comparison value, got {other}"
            )))
        }
    };
    Ok(node)
}

fn half_range<T>(bound: Bound<T>, min: bool) -> SearchRange<T> {
    if min {
        SearchRange::above(bound)
    } else {
        SearchRange::below(bound)
    }
}

/// Both-ends-inclusive range filter for `in lo..hi`.
fn full_range_node(
    fctx: &FilterContext,
    path: &AttributePath,
    low: &Value,
    high: &Value,
) -> Result<FilterNode> {
    let scalar_kind = |value: &Value| {
        value.kind().ok_or_else(|| {
            CompileError::UnsupportedShape(format!("range bound must be a scalar, got {value}"))
        })
    };
    let lo_kind = scalar_kind(low)?;
    let hi_kind = scalar_kind(high)?;
    if lo_kind != hi_kind {
        return Err(CompileError::HeterogeneousRange {
            min: lo_kind,
            max: hi_kind,
        });
    }
    let node = if lo_kind == ValueKind::Numeric {
        FilterNode::GranularRange {
            field: mangle(path, ValueKind::Numeric, &fctx.analyzer),
            range: SearchRange::between(
                Bound::inclusive(GranularTerms::of(numeric_of(low))),
                Bound::inclusive(GranularTerms::of(numeric_of(high))),
            ),
            boost: fctx.boost,
        }
    } else {
        FilterNode::Range {
            field: mangle(path, lo_kind, &fctx.analyzer),
            range: SearchRange::between(
                Bound::inclusive(scalar_term(low)),
                Bound::inclusive(scalar_term(high)),
            ),
            boost: fctx.boost,
        }
    };
    Ok(node)
}

fn numeric_of(value: &Value) -> f64 {
    value.as_f64().unwrap_or_default()
}

fn scalar_term(value: &Value) -> Term {
    match value {
        Value::Null => Term::null(),
        Value::Boolean(b) => Term::boolean(*b),
        Value::String(s) => Term::string(s),
        // numeric bounds take the granular path, compounds never get here
        _ => Term::from_bytes(Vec::new()),
    }
}
