//! Pratt (top-down operator precedence) expression parsing.
//!
//! Binding powers follow §4.3's ladder, low to high: `= != | < > | +
//! - | * / | prefix-! prefix- | call-paren`. Binary operators are
//! left-associative, implemented the usual way: the recursive call
//! for the right-hand operand uses `left_bp + 1` as its minimum
//! binding power.

use cogen_lex::TokenKind;

use crate::ast::Expr;
use crate::error::ParseError;
use crate::parser::Parser;

mod bp {
    pub const MIN: u8 = 0;
    pub const EQUALITY: u8 = 2;
    pub const COMPARISON: u8 = 4;
    pub const ADDITIVE: u8 = 6;
    pub const MULTIPLICATIVE: u8 = 8;
    pub const PREFIX: u8 = 10;
}

fn infix_binding_power(kind: TokenKind) -> Option<(u8, &'static str)> {
    use TokenKind::*;
    Some(match kind {
        Equal => (bp::EQUALITY, "="),
        BangEqual => (bp::EQUALITY, "!="),
        Less => (bp::COMPARISON, "<"),
        Greater => (bp::COMPARISON, ">"),
        Plus => (bp::ADDITIVE, "+"),
        Minus => (bp::ADDITIVE, "-"),
        Star => (bp::MULTIPLICATIVE, "*"),
        Slash => (bp::MULTIPLICATIVE, "/"),
        _ => return None,
    })
}

impl Parser {
    /// Parse an expression whose leading operator binds at least as
    /// tightly as `min_bp`.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        loop {
            let Some((left_bp, op)) = infix_binding_power(self.cur().kind) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            self.bump();
            let right = self.parse_expr(left_bp + 1)?;
            left = Expr::Infix { op: op.to_string(), left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.cur().kind {
            TokenKind::Bang => {
                self.bump();
                let expr = self.parse_expr(bp::PREFIX)?;
                Ok(Expr::Prefix { op: "!".into(), expr: Box::new(expr) })
            }
            TokenKind::Minus => {
                self.bump();
                let expr = self.parse_expr(bp::PREFIX)?;
                Ok(Expr::Prefix { op: "-".into(), expr: Box::new(expr) })
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let tok = self.cur().clone();
        match tok.kind {
            TokenKind::Number => {
                self.bump();
                let value: i64 = tok.literal.parse().map_err(|_| ParseError::UnexpectedToken {
                    expected: "a valid integer literal".into(),
                    found: tok.literal.clone(),
                    span: tok.span,
                })?;
                Ok(Expr::Int(value))
            }
            TokenKind::True => {
                self.bump();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.bump();
                Ok(Expr::Bool(false))
            }
            TokenKind::Symbol => {
                self.bump();
                Ok(Expr::Symbol(tok.literal))
            }
            TokenKind::Quote => self.parse_constant(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr(bp::MIN)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Call => {
                self.bump();
                let label = self.parse_label()?;
                let args = self.parse_call_args();
                Ok(Expr::Call { label, args })
            }
            TokenKind::Ident => {
                self.bump();
                if self.at(TokenKind::LParen) {
                    self.parse_primitive_call(tok.literal)
                } else {
                    Ok(Expr::Ident(tok.literal))
                }
            }
            _ => Err(ParseError::NoPrefixRule {
                found: tok.kind.to_string(),
                span: tok.span,
            }),
        }
    }

    fn parse_primitive_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr(bp::MIN)?);
                if self.at(TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Expr::PrimitiveCall { name, args })
    }

    /// `'atom` or `'(...)`. Inside a quoted list, bare identifiers
    /// denote symbols rather than variable references (Lisp-style
    /// quote semantics), and nested lists need no individual leading
    /// quote.
    fn parse_constant(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::Quote, "'''")?;
        if self.at(TokenKind::LParen) {
            self.bump();
            let mut items = Vec::new();
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                items.push(self.parse_quoted_atom()?);
            }
            self.expect(TokenKind::RParen, "')'")?;
            Ok(Expr::Constant(Box::new(Expr::List(items))))
        } else {
            let atom = self.parse_quoted_atom()?;
            Ok(Expr::Constant(Box::new(atom)))
        }
    }

    fn parse_quoted_atom(&mut self) -> Result<Expr, ParseError> {
        let tok = self.cur().clone();
        match tok.kind {
            TokenKind::Number => {
                self.bump();
                let value: i64 = tok.literal.parse().unwrap_or(0);
                Ok(Expr::Int(value))
            }
            TokenKind::Symbol | TokenKind::Ident => {
                self.bump();
                Ok(Expr::Symbol(tok.literal))
            }
            TokenKind::Quote => {
                self.bump();
                self.parse_quoted_atom()
            }
            TokenKind::LParen => {
                self.bump();
                let mut items = Vec::new();
                while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                    items.push(self.parse_quoted_atom()?);
                }
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::List(items))
            }
            _ => Err(ParseError::NoPrefixRule {
                found: tok.kind.to_string(),
                span: tok.span,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr(src: &str) -> Expr {
        let mut p = Parser::new(src);
        let e = p.parse_expr(bp::MIN).expect("expr should parse");
        assert!(p.errors.is_empty());
        e
    }

    #[test]
    fn precedence_additive_vs_multiplicative() {
        let e = parse_expr("1 + 2 * 3");
        assert_eq!(e.to_string(), "(1 + (2 * 3))");
    }

    #[test]
    fn left_associativity() {
        let e = parse_expr("1 - 2 - 3");
        assert_eq!(e.to_string(), "((1 - 2) - 3)");
    }

    #[test]
    fn comparison_binds_looser_than_additive() {
        let e = parse_expr("m = 0");
        assert_eq!(e.to_string(), "(m = 0)");
    }

    #[test]
    fn prefix_bang_and_minus() {
        let e = parse_expr("!true");
        assert_eq!(e.to_string(), "!true");
        let e = parse_expr("-n");
        assert_eq!(e.to_string(), "-n");
    }

    #[test]
    fn primitive_call_parses_as_atom() {
        let e = parse_expr("hd(q)");
        assert_eq!(e.to_string(), "hd(q)");
    }

    #[test]
    fn quoted_symbol_constant() {
        let e = parse_expr("'ack0-2");
        assert_eq!(e.to_string(), "'ack0-2");
    }

    #[test]
    fn quoted_list_constant() {
        let e = parse_expr("'(1 2 3)");
        assert_eq!(e.to_string(), "'(1 2 3)");
    }

    #[test]
    fn call_expression() {
        let e = parse_expr("call ack m n");
        assert_eq!(e.to_string(), "call ack m n");
    }
}
