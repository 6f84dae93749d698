use crate::{
    context::{FilterContext, QueryContext},
    error::{CompileError, Result},
    fold::fold_constant,
    lower::materialized,
};
use model::filter::node::{ExpressionFilter, FilterNode};
use search_syntax::ast::expr::Expression;
use std::sync::Arc;

/// Last resort for predicates no translation rule covers: constants
/// lower by truthiness, anything else is deferred to per-document
/// evaluation when an environment is available.
pub(crate) fn from_expression(
    ctx: &QueryContext,
    fctx: &FilterContext,
    node: &Expression,
) -> Result<Option<FilterNode>> {
    if node.contains_expansion() {
        return Err(CompileError::UnsupportedShape(
            "array expansion cannot be translated or deferred".to_string(),
        ));
    }
    if !node.is_deterministic() || node.references(ctx.doc_var) {
        let Some(env) = &ctx.env else {
            return Err(CompileError::UnsupportedShape(format!(
                "expression over '{}' needs an evaluation environment",
                ctx.doc_var
            )));
        };
        if ctx.is_probe() {
            return Ok(None);
        }
        return Ok(Some(FilterNode::Expression(ExpressionFilter::new(
            Arc::new(node.clone()),
            env.clone(),
            fctx.boost,
        ))));
    }
    match fold_constant(ctx, node) {
        Some(value) => Ok(materialized(ctx, || {
            if value.is_truthy() {
                FilterNode::All
            } else {
                FilterNode::Empty
            }
        })),
        None => Err(CompileError::UnsupportedShape(
            "unable to evaluate a constant expression at compile time".to_string(),
        )),
    }
}
