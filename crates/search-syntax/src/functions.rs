/// Builtins whose result changes between calls. Everything not listed here
/// is assumed deterministic.
const NON_DETERMINISTIC_FUNCTIONS: &[&str] = &["rand", "now", "uuid", "date_now"];

pub fn is_deterministic_function(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    !NON_DETERMINISTIC_FUNCTIONS.contains(&name.as_str())
}
