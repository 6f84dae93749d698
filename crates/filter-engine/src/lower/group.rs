use crate::{
    context::{FilterContext, QueryContext},
    error::Result,
    lower::{filter, funcs},
};
use model::filter::node::{FilterNode, SearchRange};
use search_syntax::ast::{
    expr::{Expression, ExpressionKind},
    operator::BinaryOperator,
};

/// `not` wraps whatever its operand compiles to.
pub(crate) fn from_negation(
    ctx: &QueryContext,
    fctx: &FilterContext,
    operand: &Expression,
) -> Result<Option<FilterNode>> {
    let child = filter(ctx, fctx, operand)?;
    Ok(child.map(|c| FilterNode::Not(Box::new(c))))
}

/// `and` / `or` over an operand list collected from the binary tree.
pub(crate) fn from_group(
    ctx: &QueryContext,
    fctx: &FilterContext,
    operator: BinaryOperator,
    node: &Expression,
) -> Result<Option<FilterNode>> {
    let mut operands = Vec::new();
    collect_operands(ctx, operator, node, fctx, &mut operands);
    let mut children = Vec::with_capacity(operands.len());
    for (operand, operand_fctx) in &operands {
        if let Some(child) = filter(ctx, operand_fctx, operand)? {
            children.push(child);
        }
    }
    if ctx.is_probe() {
        return Ok(None);
    }
    if operator == BinaryOperator::And {
        merge_sibling_ranges(&mut children, fctx.boost);
        // a conjunction fully merged into one range is that range;
        // operands are collected by operator, so a singleton can only
        // come out of the merge
        if children.len() == 1 {
            return Ok(children.pop());
        }
    }
    Ok(Some(if operator == BinaryOperator::And {
        FilterNode::And(children)
    } else {
        FilterNode::Or(children)
    }))
}

/// Splice same-kind sub-combinators into one operand list. A `boost()` or
/// `analyzer()` wrapper is peeled only when the context it establishes is
/// the one already ambient; a wrapper that changes the context keeps its
/// subtree as a single nested operand.
fn collect_operands<'e>(
    ctx: &QueryContext,
    operator: BinaryOperator,
    expr: &'e Expression,
    fctx: &FilterContext,
    out: &mut Vec<(&'e Expression, FilterContext)>,
) {
    match &expr.kind {
        ExpressionKind::Binary {
            operator: child_op,
            left,
            right,
        } if *child_op == operator => {
            collect_operands(ctx, operator, left, fctx, out);
            collect_operands(ctx, operator, right, fctx, out);
        }
        ExpressionKind::FunctionCall { name, arguments } => {
            if let Some(inner) = funcs::wrapper_context(ctx, fctx, name, arguments) {
                if inner == *fctx {
                    collect_operands(ctx, operator, &arguments[0], fctx, out);
                    return;
                }
            }
            out.push((expr, fctx.clone()));
        }
        _ => out.push((expr, fctx.clone())),
    }
}

/// Collapse complementary single-bound range filters over the same
/// mangled field into one two-bound filter. Only immediate siblings
/// carrying the conjunction's ambient boost qualify.
fn merge_sibling_ranges(children: &mut Vec<FilterNode>, ambient_boost: f32) {
    let mut i = 0;
    while i < children.len() {
        let mut j = i + 1;
        while j < children.len() {
            if let Some(merged) = merge_pair(&children[i], &children[j], ambient_boost) {
                children[i] = merged;
                children.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

fn merge_pair(a: &FilterNode, b: &FilterNode, ambient_boost: f32) -> Option<FilterNode> {
    match (a, b) {
        (
            FilterNode::Range {
                field: fa,
                range: ra,
                boost: ba,
            },
            FilterNode::Range {
                field: fb,
                range: rb,
                boost: bb,
            },
        ) if fa == fb && *ba == ambient_boost && *bb == ambient_boost => {
            combine(ra, rb).map(|range| FilterNode::Range {
                field: fa.clone(),
                range,
                boost: ambient_boost,
            })
        }
        (
            FilterNode::GranularRange {
                field: fa,
                range: ra,
                boost: ba,
            },
            FilterNode::GranularRange {
                field: fb,
                range: rb,
                boost: bb,
            },
        ) if fa == fb && *ba == ambient_boost && *bb == ambient_boost => {
            combine(ra, rb).map(|range| FilterNode::GranularRange {
                field: fa.clone(),
                range,
                boost: ambient_boost,
            })
        }
        _ => None,
    }
}

fn combine<T: Clone>(a: &SearchRange<T>, b: &SearchRange<T>) -> Option<SearchRange<T>> {
    match ((&a.min, &a.max), (&b.min, &b.max)) {
        ((Some(min), None), (None, Some(max))) | ((None, Some(max)), (Some(min), None)) => {
            Some(SearchRange {
                min: Some(min.clone()),
                max: Some(max.clone()),
            })
        }
        _ => None,
    }
}
