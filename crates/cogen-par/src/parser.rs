//! Recursive-descent parsing of programs, blocks and statements. See
//! [`crate::expr`] for the Pratt expression core.

use cogen_lex::{Lexer, Token, TokenKind};
use cogen_util::Span;

use crate::ast::{Block, Label, Program, Rhs, Stmt};
use crate::error::ParseError;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(src: &str) -> Self {
        let tokens = Lexer::new(src).tokenize();
        Self { tokens, pos: 0, errors: Vec::new() }
    }

    pub(crate) fn cur(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.cur().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else if self.at(TokenKind::Eof) {
            Err(ParseError::UnexpectedEof { expected: expected.into(), span: self.cur().span })
        } else {
            Err(ParseError::UnexpectedToken {
                expected: expected.into(),
                found: self.cur().kind.to_string(),
                span: self.cur().span,
            })
        }
    }

    fn record(&mut self, err: ParseError) {
        self.errors.push(err);
    }

    fn is_label_start(&self) -> bool {
        matches!(self.cur().kind, TokenKind::Ident | TokenKind::Number)
            && self.peek(1).kind == TokenKind::Colon
    }

    fn is_header_start(&self) -> bool {
        self.at(TokenKind::Ident) && self.peek(1).kind == TokenKind::LParen
    }

    pub(crate) fn parse_label(&mut self) -> Result<Label, ParseError> {
        let tok = if self.at(TokenKind::Ident) || self.at(TokenKind::Number) {
            self.bump()
        } else {
            return Err(ParseError::UnexpectedToken {
                expected: "a label".into(),
                found: self.cur().kind.to_string(),
                span: self.cur().span,
            });
        };
        Ok(Label::new(tok.literal, tok.span))
    }

    /// Optionally consume the `goto` keyword, which §6's grammar
    /// allows (but does not require) before a label in `if` arms.
    fn skip_optional_goto(&mut self) {
        if self.at(TokenKind::Goto) {
            self.bump();
        }
    }

    pub fn parse_program(mut self) -> (Program, Vec<ParseError>) {
        let mut program = Program::default();

        if self.is_header_start() {
            let name_tok = self.bump();
            program.name = Some(name_tok.literal);
            if let Err(e) = self.expect(TokenKind::LParen, "'('") {
                self.record(e);
            }
            if !self.at(TokenKind::RParen) {
                loop {
                    match self.expect(TokenKind::Ident, "a parameter name") {
                        Ok(tok) => program.params.push(tok.literal),
                        Err(e) => {
                            self.record(e);
                            break;
                        }
                    }
                    if self.at(TokenKind::Comma) {
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
            if let Err(e) = self.expect(TokenKind::RParen, "')'") {
                self.record(e);
            }
            if let Err(e) = self.expect(TokenKind::Semicolon, "';'") {
                self.record(e);
            }
        }

        while !self.at(TokenKind::Eof) {
            match self.parse_block() {
                Ok(block) => program.blocks.push(block),
                Err(e) => {
                    self.record(e);
                    // best-effort recovery: skip to the next label or EOF
                    while !self.at(TokenKind::Eof) && !self.is_label_start() {
                        self.bump();
                    }
                }
            }
        }

        (program, self.errors)
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let label = self.parse_label()?;
        let start_span = self.cur().span;
        self.expect(TokenKind::Colon, "':'")?;

        let mut stmts = Vec::new();
        loop {
            let stmt = self.parse_statement()?;
            stmts.push(stmt);
            self.expect(TokenKind::Semicolon, "';'")?;
            if self.at(TokenKind::Eof) || self.is_label_start() {
                break;
            }
        }

        let span = label.span.to(start_span);
        Ok(Block::new(label, stmts, span))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.cur().span;
        match self.cur().kind {
            TokenKind::Goto => {
                self.bump();
                let label = self.parse_label()?;
                Ok(Stmt::Goto { label, span })
            }
            TokenKind::Return => {
                self.bump();
                let value = self.parse_expr(0)?;
                Ok(Stmt::Return { value, span })
            }
            TokenKind::If => {
                self.bump();
                let cond = self.parse_expr(0)?;
                self.skip_optional_goto();
                let label_true = self.parse_label()?;
                self.expect(TokenKind::Else, "'else'")?;
                self.skip_optional_goto();
                let label_false = self.parse_label()?;
                Ok(Stmt::If { cond, label_true, label_false, span })
            }
            TokenKind::Ident if self.peek(1).kind == TokenKind::Assign => {
                let name = self.bump().literal;
                self.bump(); // :=
                let rhs = if self.at(TokenKind::Call) {
                    self.bump();
                    let label = self.parse_label()?;
                    let args = self.parse_call_args();
                    Rhs::Call { label, args }
                } else {
                    Rhs::Expr(self.parse_expr(0)?)
                };
                Ok(Stmt::Assign { name, rhs, span })
            }
            _ => {
                let expr = self.parse_expr(0)?;
                Ok(Stmt::Expr { expr, span })
            }
        }
    }

    /// `call`'s argument list is a bare run of identifiers (§6: `"call"
    /// label { id }`), not comma-separated.
    pub(crate) fn parse_call_args(&mut self) -> Vec<String> {
        let mut args = Vec::new();
        while self.at(TokenKind::Ident) {
            args.push(self.bump().literal);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Program {
        let (program, errors) = Parser::new(src).parse_program();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        program
    }

    #[test]
    fn parses_header_and_params() {
        let p = parse_ok("ack (m, n);\nack: return m;");
        assert_eq!(p.name.as_deref(), Some("ack"));
        assert_eq!(p.params, vec!["m", "n"]);
        assert_eq!(p.blocks.len(), 1);
    }

    #[test]
    fn parses_headerless_program() {
        let p = parse_ok("l0: return 1;");
        assert!(p.name.is_none());
        assert_eq!(p.blocks[0].label.name, "l0");
    }

    #[test]
    fn parses_if_with_optional_goto() {
        let p = parse_ok("ack: if m = 0 goto done else next;\ndone: return 1;\nnext: return 0;");
        match &p.blocks[0].stmts[0] {
            Stmt::If { label_true, label_false, .. } => {
                assert_eq!(label_true.name, "done");
                assert_eq!(label_false.name, "next");
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn parses_if_without_goto_keyword() {
        let p = parse_ok("ack: if m = 0 done else next;\ndone: return 1;\nnext: return 0;");
        assert!(matches!(p.blocks[0].stmts[0], Stmt::If { .. }));
    }

    #[test]
    fn parses_call_assignment() {
        let p = parse_ok("ack1: n := call ack m n; goto ack2;\nack2: return n;");
        match &p.blocks[0].stmts[0] {
            Stmt::Assign { name, rhs: Rhs::Call { label, args }, .. } => {
                assert_eq!(name, "n");
                assert_eq!(label.name, "ack");
                assert_eq!(args, &vec!["m".to_string(), "n".to_string()]);
            }
            other => panic!("expected call assignment, got {other:?}"),
        }
    }

    #[test]
    fn ackermann_program_round_trips_block_count() {
        let src = "ack (m, n);\n\
                   ack: if m = 0 goto done else next;\n\
                   next: if n = 0 goto ack0 else ack1;\n\
                   done: return n + 1;\n\
                   ack0: n := 1; goto ack2;\n\
                   ack1: n := n - 1; n := call ack m n; goto ack2;\n\
                   ack2: m := m - 1; n := call ack m n; return n;\n";
        let p = parse_ok(src);
        assert_eq!(p.blocks.len(), 6);
    }
}
