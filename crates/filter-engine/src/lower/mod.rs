pub(crate) mod cmp;
pub(crate) mod expression;
pub(crate) mod funcs;
pub(crate) mod group;


use crate::{
    context::{FilterContext, QueryContext},
    error::Result,
};
use model::filter::node::FilterNode;
use search_syntax::ast::{
    expr::{Expression, ExpressionKind},
    operator::BinaryOperator,
};

/// Lower one predicate node. `Ok(None)` is the probe-mode success value;
/// materializing runs always produce a node on success.
pub(crate) fn filter(
    ctx: &QueryContext,
    fctx: &FilterContext,
    node: &Expression,
) -> Result<Option<FilterNode>> {
    match &node.kind {
        ExpressionKind::Not(operand) => group::from_negation(ctx, fctx, operand),
        ExpressionKind::Binary {
            operator,
            left,
            right,
        } => match operator {
            BinaryOperator::And | BinaryOperator::Or => {
                group::from_group(ctx, fctx, *operator, node)
            }
            BinaryOperator::Equal | BinaryOperator::NotEqual => {
                cmp::from_binary_eq(ctx, fctx, *operator, left, right, node)
            }
            BinaryOperator::GreaterThan
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterOrEqual
            | BinaryOperator::LessOrEqual => {
                cmp::from_interval(ctx, fctx, *operator, left, right, node)
            }
            BinaryOperator::In | BinaryOperator::NotIn => {
                cmp::from_in(ctx, fctx, *operator, left, right, node)
            }
            _ => expression::from_expression(ctx, fctx, node),
        },
        ExpressionKind::FunctionCall { name, arguments } => {
            funcs::from_function_call(ctx, fctx, name, arguments, node)
        }
        // a range value is always truthy as a predicate
        ExpressionKind::Range { .. } => Ok(materialized(ctx, || FilterNode::All)),
        _ => expression::from_expression(ctx, fctx, node),
    }
}

/// Build the node only when the run materializes.
pub(crate) fn materialized(
    ctx: &QueryContext,
    build: impl FnOnce() -> FilterNode,
) -> Option<FilterNode> {
    if ctx.is_probe() {
        None
    } else {
        Some(build())
    }
}
