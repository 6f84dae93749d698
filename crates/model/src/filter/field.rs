use serde::{Deserialize, Serialize};
use std::fmt;

/// Value-kind discriminator appended to an indexed field. A document
/// attribute is indexed once per value kind it holds, so `d.a == 5` and
/// `d.a == "5"` probe different index fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Null,
    Bool,
    Numeric,
    /// String values analyzed by the named analyzer. The identity
    /// analyzer is a name like any other, so custom analyzers can never
    /// collide with it.
    String { analyzer: String },
    /// Any string field regardless of analyzer.
    AnyString,
    /// Wildcard over every kind.
    AnyType,
}

/// On-index field identifier: the rendered attribute path plus the kind
/// tag. Equality is structural over both parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MangledField {
    pub path: String,
    pub tag: TypeTag,
}

impl MangledField {
    pub fn new(path: impl Into<String>, tag: TypeTag) -> Self {
        MangledField {
            path: path.into(),
            tag,
        }
    }
}

impl fmt::Display for MangledField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            TypeTag::Null => write!(f, "{}#null", self.path),
            TypeTag::Bool => write!(f, "{}#bool", self.path),
            TypeTag::Numeric => write!(f, "{}#numeric", self.path),
            TypeTag::String { analyzer } => write!(f, "{}#str:{}", self.path, analyzer),
            TypeTag::AnyString => write!(f, "{}#str:*", self.path),
            TypeTag::AnyType => write!(f, "{}#*", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_different_tags_are_distinct() {
        let numeric = MangledField::new("a.b", TypeTag::Numeric);
        let string = MangledField::new(
            "a.b",
            TypeTag::String {
                analyzer: "identity".into(),
            },
        );
        assert_ne!(numeric, string);
    }

    #[test]
    fn test_analyzer_name_is_part_of_identity() {
        let identity = MangledField::new(
            "a",
            TypeTag::String {
                analyzer: "identity".into(),
            },
        );
        let custom = MangledField::new(
            "a",
            TypeTag::String {
                analyzer: "text_en".into(),
            },
        );
        assert_ne!(identity, custom);
        assert_eq!(format!("{custom}"), "a#str:text_en");
    }
}
