use serde::{Deserialize, Serialize};

/// A single index token, exactly as it is stored in the inverted index.
/// Collisions across value kinds are impossible because the enclosing
/// field is mangled with the kind tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term(Vec<u8>);

impl Term {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Term(bytes)
    }

    /// Marker token shared by every `null` value.
    pub fn null() -> Self {
        Term(vec![0x00])
    }

    /// Marker token for a boolean value.
    pub fn boolean(value: bool) -> Self {
        Term(vec![0x01, value as u8])
    }

    /// Raw string token (no analysis applied).
    pub fn string(value: &str) -> Self {
        Term(value.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Number of precision levels emitted per numeric value.
const GRANULARITY_LEVELS: u32 = 4;
/// Bits of mantissa dropped per level.
const LEVEL_STEP_BITS: u32 = 16;

/// Precision-ordered token sequence for one numeric value, most precise
/// first. Range filters pick the coarsest level that still bounds the
/// interval; term filters use only the most precise token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GranularTerms(Vec<Term>);

impl GranularTerms {
    pub fn of(value: f64) -> Self {
        let bits = sortable_bits(value);
        let terms = (0..GRANULARITY_LEVELS)
            .map(|level| {
                let mut bytes = Vec::with_capacity(9);
                bytes.push(level as u8);
                bytes.extend_from_slice(&(bits >> (LEVEL_STEP_BITS * level)).to_be_bytes());
                Term::from_bytes(bytes)
            })
            .collect();
        GranularTerms(terms)
    }

    pub fn terms(&self) -> &[Term] {
        &self.0
    }

    pub fn most_precise(&self) -> &Term {
        &self.0[0]
    }
}

/// Order-preserving bit pattern: for any two finite doubles `a < b`
/// implies `sortable_bits(a) < sortable_bits(b)`.
fn sortable_bits(value: f64) -> u64 {
    // collapse -0.0 into 0.0 so equal numbers share one encoding
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    if bits & (1 << 63) != 0 {
        !bits
    } else {
        bits ^ (1 << 63)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_and_float_forms_encode_identically() {
        assert_eq!(GranularTerms::of(2.0), GranularTerms::of(2f64));
        assert_eq!(GranularTerms::of(0.0), GranularTerms::of(-0.0));
    }

    #[test]
    fn test_sortable_bits_preserve_order() {
        let samples = [-1000.5, -1.0, -0.25, 0.0, 0.25, 1.0, 1000.5];
        for pair in samples.windows(2) {
            assert!(sortable_bits(pair[0]) < sortable_bits(pair[1]));
        }
    }

    #[test]
    fn test_levels_are_most_precise_first() {
        let terms = GranularTerms::of(42.0);
        assert_eq!(terms.terms().len(), 4);
        assert_eq!(terms.terms()[0].as_bytes()[0], 0);
        assert_eq!(terms.terms()[3].as_bytes()[0], 3);
        assert_eq!(terms.most_precise(), &terms.terms()[0]);
    }

    #[test]
    fn test_distinct_values_differ_at_full_precision() {
        assert_ne!(
            GranularTerms::of(1.0).most_precise(),
            GranularTerms::of(2.0).most_precise()
        );
    }

    #[test]
    fn test_marker_terms() {
        assert_ne!(Term::null(), Term::boolean(false));
        assert_ne!(Term::boolean(false), Term::boolean(true));
        assert_eq!(Term::string("abc").as_bytes(), b"abc");
    }
}
