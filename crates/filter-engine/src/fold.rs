use crate::context::QueryContext;
use model::core::value::Value;
use search_syntax::ast::{
    expr::{Expression, ExpressionKind},
    literal::Literal,
};

pub(crate) fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Integer(n) => Value::Int(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::String(s) => Value::String(s.clone()),
    }
}

/// Fold without an environment: literals and composites built purely
/// from literals.
pub(crate) fn structural_constant(expr: &Expression) -> Option<Value> {
    match &expr.kind {
        ExpressionKind::Literal(literal) => Some(literal_value(literal)),
        ExpressionKind::Array(items) => items
            .iter()
            .map(structural_constant)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        ExpressionKind::Object(entries) => entries
            .iter()
            .map(|(key, item)| structural_constant(item).map(|v| (key.clone(), v)))
            .collect::<Option<Vec<_>>>()
            .map(Value::Object),
        ExpressionKind::Range { low, high } => {
            match (structural_constant(low)?, structural_constant(high)?) {
                (Value::Int(lo), Value::Int(hi)) => Some(Value::Range(lo, hi)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Fold to a compile-time constant: structurally first, then through the
/// evaluation environment if one was supplied.
pub(crate) fn fold_constant(ctx: &QueryContext, expr: &Expression) -> Option<Value> {
    structural_constant(expr).or_else(|| ctx.env.as_ref()?.fold(expr))
}
