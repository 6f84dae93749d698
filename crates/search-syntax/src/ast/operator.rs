use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    In,
    NotIn,
    And,
    Or,
}

impl BinaryOperator {
    /// True for the four ordering comparisons (`<`, `<=`, `>`, `>=`).
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOperator::GreaterThan
                | BinaryOperator::LessThan
                | BinaryOperator::GreaterOrEqual
                | BinaryOperator::LessOrEqual
        )
    }

    /// The operator that expresses the same comparison with the
    /// operands swapped (`5 > x` is `x < 5`).
    pub fn mirrored(&self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::Equal => Some(BinaryOperator::Equal),
            BinaryOperator::NotEqual => Some(BinaryOperator::NotEqual),
            BinaryOperator::GreaterThan => Some(BinaryOperator::LessThan),
            BinaryOperator::LessThan => Some(BinaryOperator::GreaterThan),
            BinaryOperator::GreaterOrEqual => Some(BinaryOperator::LessOrEqual),
            BinaryOperator::LessOrEqual => Some(BinaryOperator::GreaterOrEqual),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
            BinaryOperator::Modulo => write!(f, "%"),
            BinaryOperator::Equal => write!(f, "=="),
            BinaryOperator::NotEqual => write!(f, "!="),
            BinaryOperator::GreaterThan => write!(f, ">"),
            BinaryOperator::LessThan => write!(f, "<"),
            BinaryOperator::GreaterOrEqual => write!(f, ">="),
            BinaryOperator::LessOrEqual => write!(f, "<="),
            BinaryOperator::In => write!(f, "in"),
            BinaryOperator::NotIn => write!(f, "not in"),
            BinaryOperator::And => write!(f, "&&"),
            BinaryOperator::Or => write!(f, "||"),
        }
    }
}
