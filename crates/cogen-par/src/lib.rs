//! AST and Pratt parser for the cogen flowchart language (§3, §4.1,
//! §4.3).

pub mod ast;
pub mod error;
mod expr;
pub mod parser;

pub use ast::{Block, Expr, Label, Program, Rhs, Stmt};
pub use error::ParseError;
pub use parser::Parser;

/// Parse a complete program, returning whatever could be recovered
/// alongside any accumulated errors (§4.3: "parsing continues
/// best-effort to surface multiple errors").
pub fn parse(src: &str) -> (Program, Vec<ParseError>) {
    Parser::new(src).parse_program()
}
