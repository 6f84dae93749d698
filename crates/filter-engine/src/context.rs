use crate::analyzer::{AnalyzerRegistry, IDENTITY_ANALYZER};
use model::{execution::environment::EvaluationEnvironment, filter::node::DEFAULT_BOOST};
use search_syntax::ast::variable::Variable;
use std::sync::Arc;

/// Whether a compile run materializes a tree or only answers
/// "is this predicate translatable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    Probe,
    Materialize,
}

/// Per-invocation compile state: the document loop variable, the
/// analyzer registry, and the optional evaluation environment backing
/// constant folding and deferred predicate leaves.
#[derive(Clone)]
pub struct QueryContext<'a> {
    pub doc_var: &'a Variable,
    pub analyzers: &'a AnalyzerRegistry,
    pub env: Option<Arc<dyn EvaluationEnvironment>>,
    pub(crate) mode: CompileMode,
}

impl<'a> QueryContext<'a> {
    pub fn new(doc_var: &'a Variable, analyzers: &'a AnalyzerRegistry) -> Self {
        QueryContext {
            doc_var,
            analyzers,
            env: None,
            mode: CompileMode::Materialize,
        }
    }

    pub fn with_env(mut self, env: Arc<dyn EvaluationEnvironment>) -> Self {
        self.env = Some(env);
        self
    }

    pub(crate) fn is_probe(&self) -> bool {
        self.mode == CompileMode::Probe
    }
}

/// Ambient state threaded through recursive lowering calls. `boost()`
/// and `analyzer()` wrappers replace it for their subtree; everything
/// else passes it through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterContext {
    pub boost: f32,
    pub analyzer: String,
}

impl FilterContext {
    pub fn root() -> Self {
        FilterContext {
            boost: DEFAULT_BOOST,
            analyzer: IDENTITY_ANALYZER.to_string(),
        }
    }

    pub fn boosted(&self, factor: f32) -> Self {
        FilterContext {
            boost: self.boost * factor,
            analyzer: self.analyzer.clone(),
        }
    }

    pub fn with_analyzer(&self, name: &str) -> Self {
        FilterContext {
            boost: self.boost,
            analyzer: name.to_string(),
        }
    }
}
