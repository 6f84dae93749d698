pub mod ast;
pub mod functions;
