use crate::{
    context::{FilterContext, QueryContext},
    error::{CompileError, Result},
    fold::fold_constant,
    lower::{expression, filter, materialized},
    mangle::{mangle, mangle_any_string, mangle_any_type},
    resolver::{is_attribute_access, resolve_attribute_path},
};
use model::{
    core::value::{Value, ValueKind},
    filter::{
        node::{FilterNode, PhrasePart},
        term::Term,
    },
};
use search_syntax::ast::expr::Expression;

/// Default number of scored terms a prefix filter contributes.
pub(crate) const DEFAULT_SCORED_TERMS_LIMIT: usize = 128;

pub(crate) fn from_function_call(
    ctx: &QueryContext,
    fctx: &FilterContext,
    name: &str,
    arguments: &[Expression],
    node: &Expression,
) -> Result<Option<FilterNode>> {
    match name.to_ascii_lowercase().as_str() {
        "exists" => from_func_exists(ctx, fctx, arguments),
        "phrase" => from_func_phrase(ctx, fctx, arguments),
        "starts_with" => from_func_starts_with(ctx, fctx, arguments),
        "boost" => from_func_boost(ctx, fctx, arguments),
        "analyzer" => from_func_analyzer(ctx, fctx, arguments),
        _ => expression::from_expression(ctx, fctx, node),
    }
}

/// `boost(pred, factor)` scales the ambient boost for its subtree.
fn from_func_boost(
    ctx: &QueryContext,
    fctx: &FilterContext,
    arguments: &[Expression],
) -> Result<Option<FilterNode>> {
    if arguments.len() != 2 {
        return Err(CompileError::invalid_arguments(
            "boost",
            format!("expected 2 arguments, got {}", arguments.len()),
        ));
    }
    let factor = fold_required(ctx, "boost", 2, &arguments[1])?;
    let factor = factor.as_f64().ok_or_else(|| {
        CompileError::invalid_arguments("boost", format!("factor must be numeric, got {factor}"))
    })?;
    filter(ctx, &fctx.boosted(factor as f32), &arguments[0])
}

/// `analyzer(pred, name)` replaces the ambient analyzer for its subtree.
fn from_func_analyzer(
    ctx: &QueryContext,
    fctx: &FilterContext,
    arguments: &[Expression],
) -> Result<Option<FilterNode>> {
    if arguments.len() != 2 {
        return Err(CompileError::invalid_arguments(
            "analyzer",
            format!("expected 2 arguments, got {}", arguments.len()),
        ));
    }
    let name = fold_required(ctx, "analyzer", 2, &arguments[1])?;
    let name = require_string("analyzer", 2, &name)?;
    ctx.analyzers.get(&name)?;
    filter(ctx, &fctx.with_analyzer(&name), &arguments[0])
}

/// The filter context a `boost`/`analyzer` wrapper would establish, if it
/// can be determined statically. Used when flattening `and`/`or` chains;
/// malformed wrappers report their errors when actually compiled.
pub(crate) fn wrapper_context(
    ctx: &QueryContext,
    fctx: &FilterContext,
    name: &str,
    arguments: &[Expression],
) -> Option<FilterContext> {
    if arguments.len() != 2 {
        return None;
    }
    match name.to_ascii_lowercase().as_str() {
        "boost" => {
            let factor = fold_constant(ctx, &arguments[1])?.as_f64()?;
            Some(fctx.boosted(factor as f32))
        }
        "analyzer" => {
            let value = fold_constant(ctx, &arguments[1])?;
            let analyzer = value.as_str()?;
            if !ctx.analyzers.has_analyzer(analyzer) {
                return None;
            }
            Some(fctx.with_analyzer(analyzer))
        }
        _ => None,
    }
}

fn from_func_exists(
    ctx: &QueryContext,
    fctx: &FilterContext,
    arguments: &[Expression],
) -> Result<Option<FilterNode>> {
    let argc = arguments.len();
    if !(1..=3).contains(&argc) {
        return Err(CompileError::invalid_arguments(
            "exists",
            format!("expected 1 to 3 arguments, got {argc}"),
        ));
    }
    if !is_attribute_access(&arguments[0], ctx.doc_var) {
        return Err(CompileError::invalid_arguments(
            "exists",
            "argument 1 must be an attribute path",
        ));
    }
    let path = resolve_attribute_path(&arguments[0], ctx)?;
    let (field, match_any_type) = if argc == 1 {
        (mangle_any_type(&path), true)
    } else {
        let selector = fold_required(ctx, "exists", 2, &arguments[1])?;
        let selector = require_string("exists", 2, &selector)?.to_lowercase();
        match selector.as_str() {
            "type" if argc == 2 => (mangle_any_type(&path), false),
            "type" => {
                let kind = fold_required(ctx, "exists", 3, &arguments[2])?;
                let kind = require_string("exists", 3, &kind)?.to_lowercase();
                let field = match kind.as_str() {
                    "null" => mangle(&path, ValueKind::Null, &fctx.analyzer),
                    "bool" | "boolean" => mangle(&path, ValueKind::Bool, &fctx.analyzer),
                    "numeric" => mangle(&path, ValueKind::Numeric, &fctx.analyzer),
                    "string" => mangle_any_string(&path),
                    other => {
                        return Err(CompileError::invalid_arguments(
                            "exists",
                            format!("unknown type '{other}'"),
                        ))
                    }
                };
                (field, false)
            }
            "analyzer" if argc == 3 => {
                let name = fold_required(ctx, "exists", 3, &arguments[2])?;
                let name = require_string("exists", 3, &name)?;
                ctx.analyzers.get(&name)?;
                (mangle(&path, ValueKind::String, &name), false)
            }
            "analyzer" => {
                return Err(CompileError::invalid_arguments(
                    "exists",
                    "'analyzer' needs an analyzer name argument",
                ))
            }
            other => {
                return Err(CompileError::invalid_arguments(
                    "exists",
                    format!("unknown selector '{other}'"),
                ))
            }
        }
    };
    Ok(materialized(ctx, || FilterNode::Exists {
        field,
        match_any_type,
        boost: fctx.boost,
    }))
}

fn from_func_phrase(
    ctx: &QueryContext,
    fctx: &FilterContext,
    arguments: &[Expression],
) -> Result<Option<FilterNode>> {
    let argc = arguments.len();
    if argc < 2 {
        return Err(CompileError::invalid_arguments(
            "phrase",
            format!("expected at least 2 arguments, got {argc}"),
        ));
    }
    if !is_attribute_access(&arguments[0], ctx.doc_var) {
        return Err(CompileError::invalid_arguments(
            "phrase",
            "argument 1 must be an attribute path",
        ));
    }
    let path = resolve_attribute_path(&arguments[0], ctx)?;

    // the term/gap sequence has odd length, so an even count means the
    // last argument is an analyzer override
    let mut value_argc = argc - 1;
    let mut analyzer_name = fctx.analyzer.clone();
    if value_argc % 2 == 0 {
        let name = fold_required(ctx, "phrase", argc, &arguments[argc - 1])?;
        analyzer_name = require_string("phrase", argc, &name)?;
        value_argc -= 1;
    }
    let analyzer = ctx.analyzers.get(&analyzer_name)?;

    let mut parts: Vec<PhrasePart> = Vec::new();
    let mut gap = 0u64;
    for (i, arg) in arguments[1..=value_argc].iter().enumerate() {
        let value = fold_required(ctx, "phrase", i + 2, arg)?;
        match value {
            Value::String(s) => {
                parts.push(PhrasePart {
                    terms: analyzer.tokenize(&s),
                    gap,
                });
                gap = 0;
            }
            Value::Int(n) if n >= 0 => gap += n as u64,
            Value::Float(f) if f >= 0.0 => gap += f as u64,
            other => {
                return Err(CompileError::invalid_arguments(
                    "phrase",
                    format!(
                        "argument {} must be a term or a non-negative gap, got {other}",
                        i + 2
                    ),
                ))
            }
        }
    }
    if parts.is_empty() {
        return Err(CompileError::invalid_arguments(
            "phrase",
            "no phrase terms given",
        ));
    }
    if gap != 0 {
        return Err(CompileError::invalid_arguments(
            "phrase",
            "dangling gap after the last term",
        ));
    }
    Ok(materialized(ctx, || FilterNode::Phrase {
        field: mangle(&path, ValueKind::String, &analyzer_name),
        parts,
        boost: fctx.boost,
    }))
}

fn from_func_starts_with(
    ctx: &QueryContext,
    fctx: &FilterContext,
    arguments: &[Expression],
) -> Result<Option<FilterNode>> {
    let argc = arguments.len();
    if !(2..=3).contains(&argc) {
        return Err(CompileError::invalid_arguments(
            "starts_with",
            format!("expected 2 or 3 arguments, got {argc}"),
        ));
    }
    if !is_attribute_access(&arguments[0], ctx.doc_var) {
        return Err(CompileError::invalid_arguments(
            "starts_with",
            "argument 1 must be an attribute path",
        ));
    }
    let path = resolve_attribute_path(&arguments[0], ctx)?;
    let prefix = fold_required(ctx, "starts_with", 2, &arguments[1])?;
    let prefix = require_string("starts_with", 2, &prefix)?;
    let scored_terms_limit = if argc == 3 {
        match fold_required(ctx, "starts_with", 3, &arguments[2])? {
            Value::Int(n) if n >= 0 => n as usize,
            // floats truncate toward zero
            Value::Float(f) if f >= 0.0 => f as usize,
            other => {
                return Err(CompileError::invalid_arguments(
                    "starts_with",
                    format!("scored terms limit must be a non-negative number, got {other}"),
                ))
            }
        }
    } else {
        DEFAULT_SCORED_TERMS_LIMIT
    };
    Ok(materialized(ctx, || FilterNode::Prefix {
        field: mangle(&path, ValueKind::String, &fctx.analyzer),
        term: Term::string(&prefix),
        scored_terms_limit,
        boost: fctx.boost,
    }))
}

/// Fold a function argument that must be a compile-time constant.
fn fold_required(
    ctx: &QueryContext,
    function: &str,
    position: usize,
    arg: &Expression,
) -> Result<Value> {
    if !arg.is_deterministic() {
        return Err(CompileError::invalid_arguments(
            function,
            format!("argument {position} is non-deterministic"),
        ));
    }
    fold_constant(ctx, arg).ok_or_else(|| {
        CompileError::invalid_arguments(
            function,
            format!("argument {position} is not a compile-time constant"),
        )
    })
}

fn require_string(function: &str, position: usize, value: &Value) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        CompileError::invalid_arguments(
            function,
            format!("argument {position} must be a string, got {value}"),
        )
    })
}
