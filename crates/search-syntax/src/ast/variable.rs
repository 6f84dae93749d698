use serde::{Deserialize, Serialize};
use std::fmt;

/// A query variable. Identity is the pair of name and numeric id, so two
/// loop variables that happen to share a name never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub id: u32,
}

impl Variable {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Variable {
            name: name.into(),
            id,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
