use crate::{
    ast::{literal::Literal, operator::BinaryOperator, variable::Variable},
    functions::is_deterministic_function,
};
use bitflags::bitflags;

bitflags! {
    /// Node properties computed once at construction and cached.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExprFlags: u8 {
        /// Evaluates to the same value on every call (no `rand()` etc.).
        const DETERMINISTIC = 0b0000_0001;
        /// A literal, or a composite built purely from literals.
        const CONSTANT = 0b0000_0010;
    }
}

/// Expression node. Built through the constructor helpers so that
/// `flags` always reflects the subtree underneath.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub flags: ExprFlags,
}

/// Expression types
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Literal),
    Array(Vec<Expression>),
    Object(Vec<(String, Expression)>),
    Range {
        low: Box<Expression>,
        high: Box<Expression>,
    },
    Variable(Variable),
    AttributeAccess {
        object: Box<Expression>,
        name: String,
    },
    IndexedAccess {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    /// `a[*]` — fans out over all elements of an array attribute.
    Expansion(Box<Expression>),
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    FunctionCall {
        name: String,
        arguments: Vec<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        let flags = compute_flags(&kind);
        Expression { kind, flags }
    }

    pub fn literal(literal: Literal) -> Self {
        Expression::new(ExpressionKind::Literal(literal))
    }

    pub fn integer(value: i64) -> Self {
        Expression::literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Expression::literal(Literal::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::literal(Literal::Boolean(value))
    }

    pub fn null() -> Self {
        Expression::literal(Literal::Null)
    }

    pub fn array(items: Vec<Expression>) -> Self {
        Expression::new(ExpressionKind::Array(items))
    }

    pub fn object(entries: Vec<(String, Expression)>) -> Self {
        Expression::new(ExpressionKind::Object(entries))
    }

    pub fn range(low: Expression, high: Expression) -> Self {
        Expression::new(ExpressionKind::Range {
            low: Box::new(low),
            high: Box::new(high),
        })
    }

    pub fn variable(variable: Variable) -> Self {
        Expression::new(ExpressionKind::Variable(variable))
    }

    pub fn attribute(object: Expression, name: impl Into<String>) -> Self {
        Expression::new(ExpressionKind::AttributeAccess {
            object: Box::new(object),
            name: name.into(),
        })
    }

    pub fn indexed(object: Expression, index: Expression) -> Self {
        Expression::new(ExpressionKind::IndexedAccess {
            object: Box::new(object),
            index: Box::new(index),
        })
    }

    pub fn expansion(object: Expression) -> Self {
        Expression::new(ExpressionKind::Expansion(Box::new(object)))
    }

    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::new(ExpressionKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn not(operand: Expression) -> Self {
        Expression::new(ExpressionKind::Not(Box::new(operand)))
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Expression::new(ExpressionKind::FunctionCall {
            name: name.into(),
            arguments,
        })
    }

    pub fn is_deterministic(&self) -> bool {
        self.flags.contains(ExprFlags::DETERMINISTIC)
    }

    pub fn is_constant(&self) -> bool {
        self.flags.contains(ExprFlags::CONSTANT)
    }

    /// Does any node of this subtree read `variable`?
    pub fn references(&self, variable: &Variable) -> bool {
        match &self.kind {
            ExpressionKind::Literal(_) => false,
            ExpressionKind::Variable(v) => v == variable,
            ExpressionKind::Array(items) => items.iter().any(|e| e.references(variable)),
            ExpressionKind::Object(entries) => {
                entries.iter().any(|(_, e)| e.references(variable))
            }
            ExpressionKind::Range { low, high } => {
                low.references(variable) || high.references(variable)
            }
            ExpressionKind::AttributeAccess { object, .. } => object.references(variable),
            ExpressionKind::IndexedAccess { object, index } => {
                object.references(variable) || index.references(variable)
            }
            ExpressionKind::Expansion(object) => object.references(variable),
            ExpressionKind::Binary { left, right, .. } => {
                left.references(variable) || right.references(variable)
            }
            ExpressionKind::Not(operand) => operand.references(variable),
            ExpressionKind::FunctionCall { arguments, .. } => {
                arguments.iter().any(|e| e.references(variable))
            }
        }
    }

    /// Does any node of this subtree fan out with `[*]`?
    pub fn contains_expansion(&self) -> bool {
        match &self.kind {
            ExpressionKind::Expansion(_) => true,
            ExpressionKind::Literal(_) | ExpressionKind::Variable(_) => false,
            ExpressionKind::Array(items) => items.iter().any(|e| e.contains_expansion()),
            ExpressionKind::Object(entries) => {
                entries.iter().any(|(_, e)| e.contains_expansion())
            }
            ExpressionKind::Range { low, high } => {
                low.contains_expansion() || high.contains_expansion()
            }
            ExpressionKind::AttributeAccess { object, .. } => object.contains_expansion(),
            ExpressionKind::IndexedAccess { object, index } => {
                object.contains_expansion() || index.contains_expansion()
            }
            ExpressionKind::Binary { left, right, .. } => {
                left.contains_expansion() || right.contains_expansion()
            }
            ExpressionKind::Not(operand) => operand.contains_expansion(),
            ExpressionKind::FunctionCall { arguments, .. } => {
                arguments.iter().any(|e| e.contains_expansion())
            }
        }
    }
}

fn intersect(items: impl Iterator<Item = ExprFlags>) -> ExprFlags {
    items.fold(ExprFlags::all(), |acc, f| acc & f)
}

fn compute_flags(kind: &ExpressionKind) -> ExprFlags {
    match kind {
        ExpressionKind::Literal(_) => ExprFlags::DETERMINISTIC | ExprFlags::CONSTANT,
        ExpressionKind::Variable(_) => ExprFlags::DETERMINISTIC,
        ExpressionKind::Array(items) => intersect(items.iter().map(|e| e.flags)),
        ExpressionKind::Object(entries) => intersect(entries.iter().map(|(_, e)| e.flags)),
        ExpressionKind::Range { low, high } => low.flags & high.flags,
        // Accesses read the document, so they are never constant, but they
        // stay deterministic as long as their inputs are.
        ExpressionKind::AttributeAccess { object, .. } => {
            object.flags & ExprFlags::DETERMINISTIC
        }
        ExpressionKind::IndexedAccess { object, index } => {
            object.flags & index.flags & ExprFlags::DETERMINISTIC
        }
        ExpressionKind::Expansion(object) => object.flags & ExprFlags::DETERMINISTIC,
        ExpressionKind::Binary { left, right, .. } => {
            (left.flags & right.flags) & ExprFlags::DETERMINISTIC
        }
        ExpressionKind::Not(operand) => operand.flags & ExprFlags::DETERMINISTIC,
        ExpressionKind::FunctionCall { name, arguments } => {
            if !is_deterministic_function(name) {
                ExprFlags::empty()
            } else {
                intersect(arguments.iter().map(|e| e.flags)) & ExprFlags::DETERMINISTIC
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Variable {
        Variable::new("d", 0)
    }

    #[test]
    fn test_literals_are_constant_and_deterministic() {
        let e = Expression::integer(5);
        assert!(e.is_constant());
        assert!(e.is_deterministic());
    }

    #[test]
    fn test_array_of_literals_is_constant() {
        let e = Expression::array(vec![Expression::integer(1), Expression::string("x")]);
        assert!(e.is_constant());
    }

    #[test]
    fn test_attribute_access_is_not_constant() {
        let e = Expression::attribute(Expression::variable(doc()), "a");
        assert!(!e.is_constant());
        assert!(e.is_deterministic());
    }

    #[test]
    fn test_nondeterministic_call_poisons_flags() {
        let e = Expression::call("rand", vec![]);
        assert!(!e.is_deterministic());
        let parent = Expression::binary(
            BinaryOperator::GreaterThan,
            Expression::attribute(Expression::variable(doc()), "a"),
            e,
        );
        assert!(!parent.is_deterministic());
    }

    #[test]
    fn test_references_tracks_variable_identity() {
        let other = Variable::new("d", 1);
        let e = Expression::attribute(Expression::variable(doc()), "a");
        assert!(e.references(&doc()));
        assert!(!e.references(&other));
    }

    #[test]
    fn test_contains_expansion() {
        let e = Expression::binary(
            BinaryOperator::Equal,
            Expression::expansion(Expression::attribute(Expression::variable(doc()), "a")),
            Expression::integer(1),
        );
        assert!(e.contains_expansion());
    }
}
