use crate::{
    core::value::Value,
    execution::environment::EvaluationEnvironment,
    filter::{
        field::MangledField,
        term::{GranularTerms, Term},
    },
};
use search_syntax::ast::expr::Expression;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

pub const DEFAULT_BOOST: f32 = 1.0;

/// One end of a range filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound<T> {
    pub value: T,
    pub inclusive: bool,
}

impl<T> Bound<T> {
    pub fn inclusive(value: T) -> Self {
        Bound {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: T) -> Self {
        Bound {
            value,
            inclusive: false,
        }
    }
}

/// Interval with at least one end present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRange<T> {
    pub min: Option<Bound<T>>,
    pub max: Option<Bound<T>>,
}

impl<T> SearchRange<T> {
    pub fn above(min: Bound<T>) -> Self {
        SearchRange {
            min: Some(min),
            max: None,
        }
    }

    pub fn below(max: Bound<T>) -> Self {
        SearchRange {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: Bound<T>, max: Bound<T>) -> Self {
        SearchRange {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Tokens of one phrase argument plus the number of skippable positions
/// between it and the previous part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhrasePart {
    pub terms: Vec<Term>,
    pub gap: u64,
}

/// Compiled filter tree, the unit the index evaluation engine consumes.
///
/// Leaves carry the boost that was ambient where they were compiled;
/// combinators and the constant filters carry none.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Term {
        field: MangledField,
        term: Term,
        boost: f32,
    },
    Range {
        field: MangledField,
        range: SearchRange<Term>,
        boost: f32,
    },
    GranularRange {
        field: MangledField,
        range: SearchRange<GranularTerms>,
        boost: f32,
    },
    Phrase {
        field: MangledField,
        parts: Vec<PhrasePart>,
        boost: f32,
    },
    Prefix {
        field: MangledField,
        term: Term,
        scored_terms_limit: usize,
        boost: f32,
    },
    Exists {
        field: MangledField,
        match_any_type: bool,
        boost: f32,
    },
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
    /// Matches every document.
    All,
    /// Matches nothing.
    Empty,
    /// Predicate deferred to per-document evaluation.
    Expression(ExpressionFilter),
}

/// Deferred predicate leaf: the original expression subtree plus the
/// environment that will evaluate it per document.
#[derive(Clone)]
pub struct ExpressionFilter {
    node: Arc<Expression>,
    env: Arc<dyn EvaluationEnvironment>,
    pub boost: f32,
}

impl ExpressionFilter {
    pub fn new(node: Arc<Expression>, env: Arc<dyn EvaluationEnvironment>, boost: f32) -> Self {
        ExpressionFilter { node, env, boost }
    }

    pub fn node(&self) -> &Expression {
        &self.node
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.env.evaluate(&self.node, document)
    }
}

// The environment handle has no meaningful identity; two deferred leaves
// are the same filter when they defer the same expression.
impl PartialEq for ExpressionFilter {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.boost == other.boost
    }
}

impl fmt::Debug for ExpressionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionFilter")
            .field("node", &self.node)
            .field("boost", &self.boost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_constructors() {
        let above = SearchRange::above(Bound::exclusive(Term::string("a")));
        assert!(above.min.is_some());
        assert!(above.max.is_none());

        let between = SearchRange::between(
            Bound::inclusive(Term::string("a")),
            Bound::exclusive(Term::string("b")),
        );
        assert!(between.min.as_ref().is_some_and(|b| b.inclusive));
        assert!(between.max.as_ref().is_some_and(|b| !b.inclusive));
    }

    #[test]
    fn test_filter_node_equality_is_structural() {
        let field = MangledField::new("a", crate::filter::field::TypeTag::Numeric);
        let lhs = FilterNode::Term {
            field: field.clone(),
            term: GranularTerms::of(5.0).most_precise().clone(),
            boost: DEFAULT_BOOST,
        };
        let rhs = FilterNode::Term {
            field,
            term: GranularTerms::of(5.0).most_precise().clone(),
            boost: DEFAULT_BOOST,
        };
        assert_eq!(lhs, rhs);
    }
}
