//! The flowchart-language AST (§3, §4.1): a closed sum of statement
//! and expression variants, each carrying a [`Span`] for diagnostics.
//! Equality and `Display` are structural and ignore spans, so that the
//! transformer's deep-cloned, re-spanned copies compare equal to
//! their originals (§8's round-trip/idempotence properties rely on
//! this).

use std::fmt;

use cogen_util::Span;

/// A block label. Distinct from [`Ident`](Expr::Ident) even though
/// both carry a `String` — equality compares the name only.
#[derive(Clone, Debug, Eq)]
pub struct Label {
    pub name: String,
    pub span: Span,
}

impl Label {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::hash::Hash for Label {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    /// A quoted bare name, e.g. the `m` in `list('quote, m)`.
    Symbol(String),
    Ident(String),
    /// A quoted expression: `'atom` or `'(...)`.
    Constant(Box<Expr>),
    List(Vec<Expr>),
    Prefix {
        op: String,
        expr: Box<Expr>,
    },
    Infix {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A built-in primitive invocation, `f(e1, ..., ek)`.
    PrimitiveCall {
        name: String,
        args: Vec<Expr>,
    },
    /// `call L v1 v2 ...` used in expression position.
    Call {
        label: Label,
        args: Vec<String>,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{n}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Symbol(s) => write!(f, "'{s}"),
            Expr::Ident(s) => write!(f, "{s}"),
            Expr::Constant(inner) => write!(f, "'{inner}"),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Expr::Prefix { op, expr } => write!(f, "{op}{expr}"),
            Expr::Infix { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::PrimitiveCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            Expr::Call { label, args } => {
                write!(f, "call {label}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                Ok(())
            }
        }
    }
}

impl Expr {
    /// Free identifiers referenced by this expression (§4.6's V / fv).
    pub fn free_identifiers(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_free_identifiers(&mut out);
        out
    }

    fn collect_free_identifiers(&self, out: &mut Vec<String>) {
        match self {
            Expr::Ident(name) => out.push(name.clone()),
            Expr::Int(_) | Expr::Bool(_) | Expr::Symbol(_) | Expr::Constant(_) => {}
            Expr::List(items) => items.iter().for_each(|e| e.collect_free_identifiers(out)),
            Expr::Prefix { expr, .. } => expr.collect_free_identifiers(out),
            Expr::Infix { left, right, .. } => {
                left.collect_free_identifiers(out);
                right.collect_free_identifiers(out);
            }
            Expr::PrimitiveCall { args, .. } => {
                args.iter().for_each(|e| e.collect_free_identifiers(out))
            }
            Expr::Call { args, .. } => out.extend(args.iter().cloned()),
        }
    }
}

/// The right-hand side of an assignment: an ordinary expression, or a
/// `call` to another block (§4.6 treats these two cases differently).
#[derive(Clone, Debug, PartialEq)]
pub enum Rhs {
    Expr(Expr),
    Call { label: Label, args: Vec<String> },
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rhs::Expr(e) => write!(f, "{e}"),
            Rhs::Call { label, args } => {
                write!(f, "call {label}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                Ok(())
            }
        }
    }
}

impl Rhs {
    pub fn free_identifiers(&self) -> Vec<String> {
        match self {
            Rhs::Expr(e) => e.free_identifiers(),
            Rhs::Call { args, .. } => args.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Assign {
        name: String,
        rhs: Rhs,
        span: Span,
    },
    Goto {
        label: Label,
        span: Span,
    },
    If {
        cond: Expr,
        label_true: Label,
        label_false: Label,
        span: Span,
    },
    Return {
        value: Expr,
        span: Span,
    },
    /// A bare expression statement (only meaningful as a non-terminal
    /// statement; §4.6 requires every non-final statement to be an
    /// assignment, so this variant exists for parser completeness but
    /// is rejected by the transformer if found in non-final position
    /// with side effects that aren't assignments).
    Expr {
        expr: Expr,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::Goto { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Expr { span, .. } => *span,
        }
    }

    /// A jump statement terminates a block (§3: "every block ends
    /// with exactly one jump statement").
    pub fn is_jump(&self) -> bool {
        matches!(self, Stmt::Goto { .. } | Stmt::If { .. } | Stmt::Return { .. })
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { name, rhs, .. } => write!(f, "{name} := {rhs}"),
            Stmt::Goto { label, .. } => write!(f, "goto {label}"),
            Stmt::If { cond, label_true, label_false, .. } => {
                write!(f, "if {cond} goto {label_true} else goto {label_false}")
            }
            Stmt::Return { value, .. } => write!(f, "return {value}"),
            Stmt::Expr { expr, .. } => write!(f, "{expr}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub label: Label,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(label: Label, stmts: Vec<Stmt>, span: Span) -> Self {
        Self { label, stmts, span }
    }

    /// The block's terminal jump statement. Panics if the block is
    /// malformed (callers must validate structure first via the
    /// transformer's structural checks).
    pub fn terminal(&self) -> &Stmt {
        self.stmts.last().expect("block has no statements")
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.label)?;
        for stmt in &self.stmts {
            write!(f, "{stmt}; ")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub blocks: Vec<Block>,
}

impl Program {
    pub fn find_block(&self, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.label.name == label)
    }

    pub fn find_block_mut(&mut self, label: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.label.name == label)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.find_block(label).is_some()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name} (")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{p}")?;
            }
            writeln!(f, ");")?;
        }
        for block in &self.blocks {
            writeln!(f, "{block}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_equality_ignores_span() {
        let a = Label::new("done", Span::new(0, 4, 1, 1));
        let b = Label::new("done", Span::DUMMY);
        assert_eq!(a, b);
    }

    #[test]
    fn free_identifiers_of_infix() {
        let e = Expr::Infix {
            op: "+".into(),
            left: Box::new(Expr::Ident("n".into())),
            right: Box::new(Expr::Int(1)),
        };
        assert_eq!(e.free_identifiers(), vec!["n".to_string()]);
    }

    #[test]
    fn display_matches_source_syntax() {
        let e = Expr::Infix {
            op: "=".into(),
            left: Box::new(Expr::Ident("m".into())),
            right: Box::new(Expr::Int(0)),
        };
        assert_eq!(e.to_string(), "(m = 0)");
    }
}
