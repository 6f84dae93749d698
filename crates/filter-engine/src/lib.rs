pub mod analyzer;
pub mod context;
pub mod error;
pub mod mangle;
pub mod resolver;

mod fold;
mod lower;

pub use crate::{
    analyzer::{Analyzer, AnalyzerRegistry, IdentityAnalyzer, IDENTITY_ANALYZER},
    context::{FilterContext, QueryContext},
    error::{CompileError, Result},
};

use crate::context::CompileMode;
use model::filter::node::FilterNode;
use search_syntax::ast::expr::Expression;
use tracing::warn;

/// Compile a boolean predicate over the document loop variable into a
/// filter tree.
pub fn compile(ctx: &QueryContext, node: &Expression) -> Result<FilterNode> {
    let ctx = QueryContext {
        mode: CompileMode::Materialize,
        ..ctx.clone()
    };
    match lower::filter(&ctx, &FilterContext::root(), node) {
        Ok(Some(tree)) => Ok(tree),
        Ok(None) => Err(CompileError::UnsupportedShape(
            "compilation produced no filter".to_string(),
        )),
        Err(err) => {
            warn!("filter compilation failed: {err}");
            Err(err)
        }
    }
}

/// Decide whether `node` is translatable without building a tree.
/// Succeeds and fails exactly where `compile` does.
pub fn probe(ctx: &QueryContext, node: &Expression) -> Result<()> {
    let ctx = QueryContext {
        mode: CompileMode::Probe,
        ..ctx.clone()
    };
    lower::filter(&ctx, &FilterContext::root(), node).map(|_| ())
}
