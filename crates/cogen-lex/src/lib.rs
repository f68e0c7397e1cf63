//! Lexical analysis for the cogen flowchart language (§4.2).
//!
//! A single-pass, one-character-lookahead scanner built on a byte
//! [`cursor::Cursor`] that turns source text into a flat token stream
//! for [`cogen-par`](../cogen_par/index.html) to consume.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
