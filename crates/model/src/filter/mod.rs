pub mod field;
pub mod node;
pub mod term;
