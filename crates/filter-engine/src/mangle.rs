use crate::resolver::AttributePath;
use model::{
    core::value::ValueKind,
    filter::field::{MangledField, TypeTag},
};

/// Mangle a path for the index field holding values of `kind`. The
/// analyzer name only participates for string fields.
pub fn mangle(path: &AttributePath, kind: ValueKind, analyzer: &str) -> MangledField {
    let tag = match kind {
        ValueKind::Null => TypeTag::Null,
        ValueKind::Bool => TypeTag::Bool,
        ValueKind::Numeric => TypeTag::Numeric,
        ValueKind::String => TypeTag::String {
            analyzer: analyzer.to_string(),
        },
    };
    MangledField::new(path.field_name(), tag)
}

/// Field matching string values under any analyzer.
pub fn mangle_any_string(path: &AttributePath) -> MangledField {
    MangledField::new(path.field_name(), TypeTag::AnyString)
}

/// Field matching values of every kind.
pub fn mangle_any_type(path: &AttributePath) -> MangledField {
    MangledField::new(path.field_name(), TypeTag::AnyType)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analyzer::{AnalyzerRegistry, IDENTITY_ANALYZER},
        context::QueryContext,
        resolver::resolve_attribute_path,
    };
    use search_syntax::ast::{expr::Expression, variable::Variable};

    fn path(name: &str) -> AttributePath {
        let var = Variable::new("d", 0);
        let registry = AnalyzerRegistry::new();
        let ctx = QueryContext::new(&var, &registry);
        let expr = Expression::attribute(Expression::variable(var.clone()), name);
        resolve_attribute_path(&expr, &ctx).unwrap()
    }

    #[test]
    fn test_kind_tags_are_distinct() {
        let p = path("a");
        let tags = [
            mangle(&p, ValueKind::Null, IDENTITY_ANALYZER),
            mangle(&p, ValueKind::Bool, IDENTITY_ANALYZER),
            mangle(&p, ValueKind::Numeric, IDENTITY_ANALYZER),
            mangle(&p, ValueKind::String, IDENTITY_ANALYZER),
            mangle_any_string(&p),
            mangle_any_type(&p),
        ];
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_custom_analyzer_distinct_from_identity() {
        let p = path("a");
        assert_ne!(
            mangle(&p, ValueKind::String, IDENTITY_ANALYZER),
            mangle(&p, ValueKind::String, "text_en")
        );
        // non-string kinds ignore the ambient analyzer
        assert_eq!(
            mangle(&p, ValueKind::Numeric, IDENTITY_ANALYZER),
            mangle(&p, ValueKind::Numeric, "text_en")
        );
    }
}
