use crate::core::value::Value;
use search_syntax::ast::expr::Expression;

/// Bridge to the surrounding query engine.
///
/// Compilation calls `fold` to resolve sub-expressions that are constant
/// for the duration of the query (bind parameters, enclosing loop
/// variables). Deferred predicate leaves call `evaluate` once per
/// candidate document at search time.
pub trait EvaluationEnvironment: Send + Sync {
    /// Fold `expr` to a constant if possible; `None` means the expression
    /// is not a compile-time constant in this environment.
    fn fold(&self, expr: &Expression) -> Option<Value>;

    /// Evaluate `expr` against one document and coerce the result to a
    /// boolean.
    fn evaluate(&self, expr: &Expression, document: &Value) -> bool;
}
