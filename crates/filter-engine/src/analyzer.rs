use crate::error::{CompileError, Result};
use model::filter::term::Term;
use std::{collections::HashMap, sync::Arc};

/// Name of the built-in pass-through analyzer.
pub const IDENTITY_ANALYZER: &str = "identity";

/// A named token producer: turns a string literal into the index terms
/// the analyzer would have produced at indexing time.
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &str;
    fn tokenize(&self, input: &str) -> Vec<Term>;
}

/// Pass-through analyzer: the whole input is a single term.
#[derive(Debug, Default)]
pub struct IdentityAnalyzer;

impl Analyzer for IdentityAnalyzer {
    fn name(&self) -> &str {
        IDENTITY_ANALYZER
    }

    fn tokenize(&self, input: &str) -> Vec<Term> {
        vec![Term::string(input)]
    }
}

/// Registry of all analyzers addressable from a query.
pub struct AnalyzerRegistry {
    analyzers: HashMap<String, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// Create a new registry with the built-in identity analyzer.
    pub fn new() -> Self {
        let mut registry = Self {
            analyzers: HashMap::new(),
        };
        registry.register(Arc::new(IdentityAnalyzer));
        registry
    }

    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzers
            .insert(analyzer.name().to_string(), analyzer);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Analyzer>> {
        self.analyzers
            .get(name)
            .cloned()
            .ok_or_else(|| CompileError::UnknownAnalyzer(name.to_string()))
    }

    pub fn has_analyzer(&self, name: &str) -> bool {
        self.analyzers.contains_key(name)
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_identity() {
        let registry = AnalyzerRegistry::new();
        assert!(registry.has_analyzer(IDENTITY_ANALYZER));
        assert!(!registry.has_analyzer("text_en"));
    }

    #[test]
    fn test_unknown_analyzer_lookup_fails() {
        let registry = AnalyzerRegistry::new();
        assert_eq!(
            registry.get("missing").err(),
            Some(CompileError::UnknownAnalyzer("missing".to_string()))
        );
    }

    #[test]
    fn test_identity_produces_single_raw_term() {
        let registry = AnalyzerRegistry::new();
        let identity = registry.get(IDENTITY_ANALYZER).unwrap();
        assert_eq!(identity.tokenize("quick fox"), vec![Term::string("quick fox")]);
    }
}
