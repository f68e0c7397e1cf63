//! The cogen lexer: a single-pass, one-character-lookahead scanner
//! producing `(kind, literal, line, column)` tokens (§4.2).
//!
//! The lexer is total — it never panics on malformed input. Bytes it
//! cannot classify are emitted as `TokenKind::Illegal` tokens and left
//! for the parser to report.

use cogen_util::Span;

use crate::cursor::Cursor;
use crate::token::{lookup_keyword, Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    /// True immediately after emitting a `'` token: the next run of
    /// non-delimiter bytes is lexed as a single SYMBOL token rather
    /// than word-by-word, per §4.2's quoted-context rule.
    in_quote_context: bool,
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b';' | b'(' | b')' | b',' | b'\'' | b'"' | b':')
        || b.is_ascii_whitespace()
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { cursor: Cursor::new(src), in_quote_context: false }
    }

    fn skip_whitespace(&mut self) {
        while !self.cursor.is_at_end() && self.cursor.peek().is_ascii_whitespace() {
            self.cursor.advance();
        }
    }

    fn make_span(&self, start: usize, start_line: u32, start_col: u32) -> Span {
        Span::new(start, self.cursor.pos(), start_line, start_col)
    }

    fn read_symbol_run(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while !self.cursor.is_at_end() && !is_delimiter(self.cursor.peek()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        Token::new(TokenKind::Symbol, text, self.make_span(start, start_line, start_col))
    }

    fn read_identifier(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while !self.cursor.is_at_end()
            && (self.cursor.peek().is_ascii_alphanumeric() || self.cursor.peek() == b'_')
        {
            self.cursor.advance();
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = lookup_keyword(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, text, self.make_span(start, start_line, start_col))
    }

    fn read_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while !self.cursor.is_at_end() && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        Token::new(TokenKind::Number, text, self.make_span(start, start_line, start_col))
    }

    /// Produce the next token, advancing the cursor past it.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.cursor.pos();
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Eof, "", self.make_span(start, start_line, start_col));
        }

        if self.in_quote_context && self.cursor.peek() != b'(' {
            self.in_quote_context = false;
            return self.read_symbol_run(start, start_line, start_col);
        }
        self.in_quote_context = false;

        let ch = self.cursor.advance();
        let span = self.make_span(start, start_line, start_col);
        let single = move |kind: TokenKind| Token::new(kind, (ch as char).to_string(), span);

        match ch {
            b';' => single(TokenKind::Semicolon),
            b'(' => single(TokenKind::LParen),
            b')' => single(TokenKind::RParen),
            b',' => single(TokenKind::Comma),
            b'\'' => {
                self.in_quote_context = true;
                single(TokenKind::Quote)
            }
            b':' => {
                if self.cursor.eat(b'=') {
                    Token::new(TokenKind::Assign, ":=", self.make_span(start, start_line, start_col))
                } else {
                    single(TokenKind::Colon)
                }
            }
            b'!' => {
                if self.cursor.eat(b'=') {
                    Token::new(TokenKind::BangEqual, "!=", self.make_span(start, start_line, start_col))
                } else {
                    single(TokenKind::Bang)
                }
            }
            b'=' => single(TokenKind::Equal),
            b'<' => single(TokenKind::Less),
            b'>' => single(TokenKind::Greater),
            b'-' => single(TokenKind::Minus),
            b'+' => single(TokenKind::Plus),
            b'*' => single(TokenKind::Star),
            b'/' => single(TokenKind::Slash),
            b'"' => single(TokenKind::Illegal),
            c if c.is_ascii_digit() => self.read_number(start, start_line, start_col),
            c if c.is_ascii_alphabetic() || c == b'_' => self.read_identifier(start, start_line, start_col),
            _ => single(TokenKind::Illegal),
        }
    }

    /// Lex the entire input into a `Vec<Token>`, terminated by exactly
    /// one EOF token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_header() {
        let ks = kinds("ack (m, n);");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_assign_and_bang_equal() {
        let ks = kinds("n := m != 0");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Ident,
                TokenKind::BangEqual,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn quoted_symbol_is_single_token() {
        let toks = Lexer::new("'ack0-2").tokenize();
        assert_eq!(toks[0].kind, TokenKind::Quote);
        assert_eq!(toks[1].kind, TokenKind::Symbol);
        assert_eq!(toks[1].literal, "ack0-2");
    }

    #[test]
    fn quoted_list_is_not_collapsed_into_a_symbol() {
        let ks = kinds("'(1 2 3)");
        assert_eq!(
            ks,
            vec![
                TokenKind::Quote,
                TokenKind::LParen,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_positions_across_lines() {
        let toks = Lexer::new("ack:\n  return 1;").tokenize();
        let ret = toks.iter().find(|t| t.kind == TokenKind::Return).unwrap();
        assert_eq!(ret.span.line, 2);
        assert_eq!(ret.span.column, 3);
    }

    #[test]
    fn illegal_bytes_are_reported_not_panicked() {
        let toks = Lexer::new("@").tokenize();
        assert_eq!(toks[0].kind, TokenKind::Illegal);
    }
}
