//! Tree-walking interpreter (§4.11).
//!
//! A single flat variable environment is shared across the whole run
//! — `call` transfers control to another block without binding fresh
//! parameters, it just resumes execution with the same environment
//! and returns whatever that block's `return` yields. This also runs
//! a *generated* specialiser (an extension program): the specialiser
//! manipulates a `code` variable holding the `Value` described in
//! [`crate::primitives`], which [`value_to_program`] converts back
//! into a runnable [`Program`] once specialisation finishes.

use std::collections::HashMap;

use cogen_par::{Expr, Label, Program, Rhs, Stmt};

use crate::error::{RuntimeError, RuntimeResult};
use crate::primitives::call_primitive;
use crate::value::Value;

pub struct Interpreter<'p> {
    program: &'p Program,
    env: HashMap<String, Value>,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program, env: HashMap::new() }
    }

    /// Bind `program.params` positionally to `args` before running.
    pub fn with_args(program: &'p Program, args: &[Value]) -> RuntimeResult<Self> {
        if args.len() != program.params.len() {
            return Err(RuntimeError::Arity {
                name: program.name.clone().unwrap_or_default(),
                expected: program.params.len(),
                got: args.len(),
            });
        }
        let mut env = HashMap::new();
        for (name, value) in program.params.iter().zip(args) {
            env.insert(name.clone(), value.clone());
        }
        Ok(Self { program, env })
    }

    /// Run from the program's first block to completion.
    pub fn run(&mut self) -> RuntimeResult<Value> {
        let start = self
            .program
            .blocks
            .first()
            .ok_or_else(|| RuntimeError::UndefinedBlock { label: "<entry>".into() })?
            .label
            .name
            .clone();
        self.run_from(&start)
    }

    /// Run from a specific label, returning whatever `return` it
    /// eventually hits. Used both as the outer driver loop and, via
    /// `call`, as a same-environment sub-invocation.
    pub fn run_from(&mut self, start_label: &str) -> RuntimeResult<Value> {
        let mut current = start_label.to_string();
        loop {
            let block = self
                .program
                .find_block(&current)
                .ok_or_else(|| RuntimeError::UndefinedBlock { label: current.clone() })?
                .clone();

            let (last, init) = block
                .stmts
                .split_last()
                .ok_or_else(|| RuntimeError::UndefinedBlock { label: current.clone() })?;

            for stmt in init {
                match stmt {
                    Stmt::Assign { name, rhs, .. } => {
                        let value = self.eval_rhs(rhs)?;
                        self.env.insert(name.clone(), value);
                    }
                    other => {
                        return Err(RuntimeError::TypeMismatch {
                            context: format!("block '{current}'"),
                            expected: "assignment".into(),
                            found: other.to_string(),
                        })
                    }
                }
            }

            match last {
                Stmt::Assign { name, rhs, .. } => {
                    let value = self.eval_rhs(rhs)?;
                    self.env.insert(name.clone(), value.clone());
                    return Ok(value);
                }
                Stmt::Goto { label, .. } => {
                    current = label.name.clone();
                }
                Stmt::If { cond, label_true, label_false, .. } => {
                    let value = self.eval_expr(cond)?;
                    current = if value.is_truthy() { label_true.name.clone() } else { label_false.name.clone() };
                }
                Stmt::Return { value, .. } => return self.eval_expr(value),
                Stmt::Expr { expr, .. } => return self.eval_expr(expr),
            }
        }
    }

    fn eval_rhs(&mut self, rhs: &Rhs) -> RuntimeResult<Value> {
        match rhs {
            Rhs::Expr(e) => self.eval_expr(e),
            Rhs::Call { label, .. } => self.run_from(&label.name),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Symbol(s) => Ok(Value::Symbol(s.clone())),
            Expr::Ident(name) => {
                self.env.get(name).cloned().ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() })
            }
            Expr::Constant(inner) => Ok(quote_to_value(inner)),
            Expr::List(items) => {
                let values = items.iter().map(|e| self.eval_expr(e)).collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::List(values))
            }
            Expr::Prefix { op, expr } => {
                let value = self.eval_expr(expr)?;
                eval_prefix(op, value)
            }
            Expr::Infix { op, left, right } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                eval_infix(op, l, r)
            }
            Expr::PrimitiveCall { name, args } => {
                let values = args.iter().map(|a| self.eval_expr(a)).collect::<RuntimeResult<Vec<_>>>()?;
                call_primitive(name, values)
            }
            Expr::Call { label, .. } => self.run_from(&label.name),
        }
    }
}

fn eval_prefix(op: &str, value: Value) -> RuntimeResult<Value> {
    match op {
        "-" => match value {
            Value::Int(n) => Ok(Value::Int(-n)),
            other => Err(RuntimeError::TypeMismatch { context: "unary -".into(), expected: "int".into(), found: other.to_string() }),
        },
        "!" => Ok(Value::Bool(!value.is_truthy())),
        other => Err(RuntimeError::UndefinedFunction { name: other.to_string() }),
    }
}

fn eval_infix(op: &str, left: Value, right: Value) -> RuntimeResult<Value> {
    use Value::*;
    match op {
        "=" => Ok(Bool(left == right)),
        "!=" => Ok(Bool(left != right)),
        "+" | "-" | "*" | "/" | "<" | ">" => match (left, right) {
            (Int(a), Int(b)) => match op {
                "+" => Ok(Int(a + b)),
                "-" => Ok(Int(a - b)),
                "*" => Ok(Int(a * b)),
                "/" => {
                    if b == 0 {
                        Err(RuntimeError::TypeMismatch { context: "/".into(), expected: "non-zero divisor".into(), found: "0".into() })
                    } else {
                        Ok(Int(a / b))
                    }
                }
                "<" => Ok(Bool(a < b)),
                ">" => Ok(Bool(a > b)),
                _ => unreachable!(),
            },
            (a, b) => Err(RuntimeError::TypeMismatch {
                context: format!("operator '{op}'"),
                expected: "int".into(),
                found: format!("{a} and {b}"),
            }),
        },
        other => Err(RuntimeError::UndefinedFunction { name: other.to_string() }),
    }
}

/// Convert a quoted AST sub-expression directly to a [`Value`]
/// without evaluating it — identifiers become their bare name as a
/// symbol, nested quotes collapse (`''x` means the same as `'x`).
fn quote_to_value(expr: &Expr) -> Value {
    match expr {
        Expr::Int(n) => Value::Int(*n),
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Symbol(s) | Expr::Ident(s) => Value::Symbol(s.clone()),
        Expr::Constant(inner) => quote_to_value(inner),
        Expr::List(items) => Value::List(items.iter().map(quote_to_value).collect()),
        Expr::Prefix { op, expr } => Value::List(vec![Value::Symbol(op.clone()), quote_to_value(expr)]),
        Expr::Infix { op, left, right } => {
            Value::List(vec![Value::Symbol(op.clone()), quote_to_value(left), quote_to_value(right)])
        }
        Expr::PrimitiveCall { name, args } => {
            let mut items = vec![Value::Symbol(name.clone())];
            items.extend(args.iter().map(quote_to_value));
            Value::List(items)
        }
        Expr::Call { label, args } => {
            let mut items = vec![Value::Symbol("call".into()), Value::Symbol(label.name.clone())];
            items.extend(args.iter().cloned().map(Value::Symbol));
            Value::List(items)
        }
    }
}

/// Reconstruct a runnable [`Program`] from the `Value` a specialiser
/// returns. The value is the residual program's block list: each element is a
/// list whose head is the block's joined label name and whose tail
/// alternates statements, the last of which must be `if`/`goto`/`return`.
pub fn value_to_program(value: &Value, params: Vec<String>) -> RuntimeResult<Program> {
    let blocks_value = value.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "residual program".into(),
        expected: "list of blocks".into(),
        found: value.to_string(),
    })?;

    let mut blocks = Vec::with_capacity(blocks_value.len());
    for block_value in blocks_value {
        blocks.push(parse_block(block_value)?);
    }
    Ok(Program { name: None, params, blocks })
}

fn parse_block(block_value: &Value) -> RuntimeResult<cogen_par::Block> {
    use cogen_util::Span;

    let items = block_value.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "residual block".into(),
        expected: "list".into(),
        found: block_value.to_string(),
    })?;
    let (head, rest) = items.split_first().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "residual block".into(),
        expected: "non-empty list".into(),
        found: "()".into(),
    })?;
    let label_name = head.value_string().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "residual block label".into(),
        expected: "atom".into(),
        found: head.to_string(),
    })?;

    let stmts = rest.iter().map(parse_statement).collect::<RuntimeResult<Vec<_>>>()?;
    Ok(cogen_par::Block::new(Label::new(label_name, Span::DUMMY), stmts, Span::DUMMY))
}

fn parse_statement(stmt_value: &Value) -> RuntimeResult<Stmt> {
    use cogen_util::Span;

    let items = stmt_value.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "residual statement".into(),
        expected: "list".into(),
        found: stmt_value.to_string(),
    })?;
    let head = items.first().and_then(Value::value_string).unwrap_or_default();

    match head.as_str() {
        "if" if items.len() == 4 => Ok(Stmt::If {
            cond: parse_expression(&items[1])?,
            label_true: parse_target_label(&items[2])?,
            label_false: parse_target_label(&items[3])?,
            span: Span::DUMMY,
        }),
        "goto" if items.len() == 2 => {
            Ok(Stmt::Goto { label: parse_target_label(&items[1])?, span: Span::DUMMY })
        }
        "return" if items.len() == 2 => {
            Ok(Stmt::Return { value: parse_expression(&items[1])?, span: Span::DUMMY })
        }
        _ if items.len() == 3 && items[1].value_string().as_deref() == Some(":=") => {
            let name = items[0].value_string().ok_or_else(|| RuntimeError::TypeMismatch {
                context: "assignment target".into(),
                expected: "identifier".into(),
                found: items[0].to_string(),
            })?;
            Ok(Stmt::Assign { name, rhs: parse_rhs(&items[2])?, span: Span::DUMMY })
        }
        other => Err(RuntimeError::TypeMismatch {
            context: "residual statement".into(),
            expected: "if/goto/return/assignment".into(),
            found: other.to_string(),
        }),
    }
}

fn parse_rhs(value: &Value) -> RuntimeResult<Rhs> {
    if let Some(items) = value.as_list() {
        if items.first().and_then(Value::value_string).as_deref() == Some("call") && items.len() == 2 {
            return Ok(Rhs::Call { label: parse_target_label(&items[1])?, args: Vec::new() });
        }
    }
    Ok(Rhs::Expr(parse_expression(value)?))
}

/// A target label may be a single symbol or a joined-name list
/// produced by `newheader`/`newblock`; both collapse to one label
/// string since the residual program's blocks are keyed by joined name.
fn parse_target_label(value: &Value) -> RuntimeResult<Label> {
    use cogen_util::Span;

    let name = match value {
        Value::Symbol(s) => s.clone(),
        Value::List(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(item.value_string().ok_or_else(|| RuntimeError::TypeMismatch {
                    context: "target label".into(),
                    expected: "atom".into(),
                    found: item.to_string(),
                })?);
            }
            parts.join("_")
        }
        other => {
            return Err(RuntimeError::TypeMismatch {
                context: "target label".into(),
                expected: "symbol or list".into(),
                found: other.to_string(),
            })
        }
    };
    Ok(Label::new(name, Span::DUMMY))
}

fn parse_expression(value: &Value) -> RuntimeResult<Expr> {
    match value {
        Value::Int(n) => Ok(Expr::Int(*n)),
        Value::Bool(b) => Ok(Expr::Bool(*b)),
        Value::Symbol(s) => Ok(Expr::Ident(s.clone())),
        Value::List(items) => {
            let head = items.first().and_then(Value::value_string);
            match head.as_deref() {
                Some("call") if items.len() == 2 => {
                    Ok(Expr::Call { label: parse_target_label(&items[1])?, args: Vec::new() })
                }
                Some(op @ ("+" | "-" | "*" | "/" | "=" | "!=" | "<" | ">")) if items.len() == 3 => {
                    Ok(Expr::Infix {
                        op: op.to_string(),
                        left: Box::new(parse_expression(&items[1])?),
                        right: Box::new(parse_expression(&items[2])?),
                    })
                }
                Some(op @ ("-" | "!")) if items.len() == 2 => {
                    Ok(Expr::Prefix { op: op.to_string(), expr: Box::new(parse_expression(&items[1])?) })
                }
                _ => Ok(Expr::List(
                    items.iter().map(quote_from_value).collect::<Vec<_>>(),
                )),
            }
        }
    }
}

fn quote_from_value(value: &Value) -> Expr {
    match value {
        Value::Int(n) => Expr::Int(*n),
        Value::Bool(b) => Expr::Bool(*b),
        Value::Symbol(s) => Expr::Symbol(s.clone()),
        Value::List(items) => Expr::List(items.iter().map(quote_from_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogen_par::parse;

    fn parse_ok(src: &str) -> Program {
        let (program, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        program
    }

    #[test]
    fn runs_straight_line_program() {
        let program = parse_ok("add (a, b);\nadd: return a + b;\n");
        let mut interp = Interpreter::with_args(&program, &[Value::Int(3), Value::Int(4)]).unwrap();
        assert_eq!(interp.run().unwrap(), Value::Int(7));
    }

    #[test]
    fn runs_if_and_goto() {
        let src = "abs (n);\nabs: if n < 0 goto neg else done;\nneg: return 0 - n;\ndone: return n;\n";
        let program = parse_ok(src);
        let mut interp = Interpreter::with_args(&program, &[Value::Int(-5)]).unwrap();
        assert_eq!(interp.run().unwrap(), Value::Int(5));
    }

    #[test]
    fn call_shares_environment_and_returns_through_return() {
        let src = "p (n);\np: n := n + 1; m := call helper; return n + m;\nhelper: return n * 2;\n";
        let program = parse_ok(src);
        let mut interp = Interpreter::with_args(&program, &[Value::Int(10)]).unwrap();
        // n becomes 11 in p, helper sees the same n and returns 22, p returns 11+22
        assert_eq!(interp.run().unwrap(), Value::Int(33));
    }

    #[test]
    fn value_to_program_reconstructs_a_runnable_block() {
        let value = Value::List(vec![Value::List(vec![
            Value::Symbol("entry".into()),
            Value::List(vec![Value::Symbol("return".into()), Value::Int(42)]),
        ])]);
        let program = value_to_program(&value, vec![]).unwrap();
        let mut interp = Interpreter::new(&program);
        assert_eq!(interp.run().unwrap(), Value::Int(42));
    }
}
