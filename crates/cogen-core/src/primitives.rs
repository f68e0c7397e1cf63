//! Residual-code construction primitives (§4.10), invoked at run time
//! by a *generated* specialiser (not by the transformer itself, which
//! only emits calls to them).
//!
//! The `code` value is a stack: `Value::List([result_program,
//! active_block_0, active_block_1, ...])`. `result_program` is itself
//! a `Value::List` of finished blocks; each block is a `Value::List`
//! whose head is its joined label name.

use crate::error::RuntimeError;
use crate::value::Value;

const TERMINAL_HEADS: [&str; 3] = ["if", "goto", "return"];

/// The "joined name" of a label-list: its elements' string values
/// concatenated with `_` (§4.10).
pub fn joined_name(label_list: &Value) -> Result<String, RuntimeError> {
    let items = label_list.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "label list".into(),
        expected: "list".into(),
        found: label_list.to_string(),
    })?;
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let s = item.value_string().ok_or_else(|| RuntimeError::TypeMismatch {
            context: "label component".into(),
            expected: "atom".into(),
            found: item.to_string(),
        })?;
        parts.push(s);
    }
    Ok(parts.join("_"))
}

fn block_head_matches(block: &Value, joined: &str) -> bool {
    block
        .as_list()
        .and_then(|l| l.first())
        .and_then(|v| v.value_string())
        .is_some_and(|s| s == joined)
}

/// `newheader(d1,...,label-list)`: build the residual program's
/// header block `[<joined-name>, d1, ...]` and wrap it as a
/// single-element (just the result program) code stack.
pub fn newheader(dynamic_vars: &[Value], label_list: &Value) -> Result<Value, RuntimeError> {
    let joined = joined_name(label_list)?;
    let mut header_block = Vec::with_capacity(dynamic_vars.len() + 1);
    header_block.push(Value::Symbol(joined));
    header_block.extend(dynamic_vars.iter().cloned());
    let result_program = Value::List(vec![Value::List(header_block)]);
    Ok(Value::List(vec![result_program]))
}

/// `newblock(code, label-list)`: push a fresh active block headed by
/// the joined label name onto the stack.
pub fn newblock(code: Value, label_list: &Value) -> Result<Value, RuntimeError> {
    let joined = joined_name(label_list)?;
    let mut stack = code.into_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "newblock".into(),
        expected: "code stack".into(),
        found: "non-list".into(),
    })?;
    stack.push(Value::List(vec![Value::Symbol(joined)]));
    Ok(Value::List(stack))
}

/// `o(code, instr)`: append `instr` to the top active block. If
/// `instr`'s head is `if`/`goto`/`return`, the block is finalised:
/// popped off the stack and appended to the result program.
pub fn o(code: Value, instr: Value) -> Result<Value, RuntimeError> {
    let mut stack = code.into_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "o".into(),
        expected: "code stack".into(),
        found: "non-list".into(),
    })?;
    if stack.len() < 2 {
        return Err(RuntimeError::NoActiveBlock);
    }
    let mut top = stack.pop().unwrap().into_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "o".into(),
        expected: "active block".into(),
        found: "non-list".into(),
    })?;

    let is_terminal = instr
        .as_list()
        .and_then(|l| l.first())
        .and_then(|v| v.value_string())
        .is_some_and(|head| TERMINAL_HEADS.contains(&head.as_str()));

    top.push(instr);

    if is_terminal {
        let mut result_program = stack.remove(0).into_list().ok_or_else(|| RuntimeError::TypeMismatch {
            context: "o".into(),
            expected: "result program".into(),
            found: "non-list".into(),
        })?;
        result_program.push(Value::List(top));
        stack.insert(0, Value::List(result_program));
    } else {
        stack.push(Value::List(top));
    }

    Ok(Value::List(stack))
}

/// `is_done(label-list, code)`: true iff a block headed by the joined
/// name exists in the result program or on the active stack.
pub fn is_done(label_list: &Value, code: &Value) -> Result<bool, RuntimeError> {
    let joined = joined_name(label_list)?;
    let stack = code.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "is_done".into(),
        expected: "code stack".into(),
        found: code.to_string(),
    })?;
    for (i, entry) in stack.iter().enumerate() {
        if i == 0 {
            if let Some(blocks) = entry.as_list() {
                if blocks.iter().any(|b| block_head_matches(b, &joined)) {
                    return Ok(true);
                }
            }
        } else if block_head_matches(entry, &joined) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `list(x...)`.
pub fn list(items: Vec<Value>) -> Value {
    Value::List(items)
}

/// `cons(a, b)`: prepend `a` to `b`, or build a 2-list if `b` isn't a
/// list.
pub fn cons(a: Value, b: Value) -> Value {
    match b {
        Value::List(mut items) => {
            items.insert(0, a);
            Value::List(items)
        }
        other => Value::List(vec![a, other]),
    }
}

/// `hd`: list head, failing on empty (§8 scenario 3).
pub fn hd(s: &Value) -> Result<Value, RuntimeError> {
    let items = s.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "hd".into(),
        expected: "list".into(),
        found: s.to_string(),
    })?;
    items.first().cloned().ok_or(RuntimeError::HeadOfEmptyList)
}

/// `tl`: list tail, failing on empty (§8 scenario 3).
pub fn tl(s: &Value) -> Result<Value, RuntimeError> {
    let items = s.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "tl".into(),
        expected: "list".into(),
        found: s.to_string(),
    })?;
    if items.is_empty() {
        return Err(RuntimeError::TailOfEmptyList);
    }
    Ok(Value::List(items[1..].to_vec()))
}

/// `newTail(item, Q)`: the suffix of `Q` starting at the first
/// sub-list whose head equals `item` (§8 scenario 4).
pub fn new_tail(item: &Value, q: &Value) -> Result<Value, RuntimeError> {
    let target = item.value_string().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "newTail".into(),
        expected: "atom".into(),
        found: item.to_string(),
    })?;
    let items = q.as_list().ok_or_else(|| RuntimeError::TypeMismatch {
        context: "newTail".into(),
        expected: "list".into(),
        found: q.to_string(),
    })?;
    for (i, sub) in items.iter().enumerate() {
        let head = sub.as_list().and_then(|l| l.first()).and_then(|v| v.value_string());
        if head.as_deref() == Some(target.as_str()) {
            return Ok(Value::List(items[i..].to_vec()));
        }
    }
    Err(RuntimeError::TailTargetNotFound { item: target })
}

/// Dispatch a primitive call by name with already-evaluated
/// arguments, for the interpreter's `PrimitiveCall` expression
/// variant.
pub fn call_primitive(name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match name {
        "hd" => {
            expect_arity(name, &args, 1)?;
            hd(&args[0])
        }
        "tl" => {
            expect_arity(name, &args, 1)?;
            tl(&args[0])
        }
        "cons" => {
            expect_arity(name, &args, 2)?;
            let mut it = args.into_iter();
            Ok(cons(it.next().unwrap(), it.next().unwrap()))
        }
        "list" => Ok(list(args)),
        "o" => {
            expect_arity(name, &args, 2)?;
            let mut it = args.into_iter();
            o(it.next().unwrap(), it.next().unwrap())
        }
        "is_done" => {
            expect_arity(name, &args, 2)?;
            Ok(Value::Bool(is_done(&args[0], &args[1])?))
        }
        "newblock" => {
            expect_arity(name, &args, 2)?;
            let mut it = args.into_iter();
            let code = it.next().unwrap();
            let label_list = it.next().unwrap();
            newblock(code, &label_list)
        }
        "newheader" => {
            if args.is_empty() {
                return Err(RuntimeError::Arity { name: name.into(), expected: 1, got: 0 });
            }
            let (dyn_vars, label_list) = args.split_at(args.len() - 1);
            newheader(dyn_vars, &label_list[0])
        }
        "newTail" => {
            expect_arity(name, &args, 2)?;
            new_tail(&args[0], &args[1])
        }
        other => Err(RuntimeError::UndefinedFunction { name: other.to_string() }),
    }
}

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() != expected {
        Err(RuntimeError::Arity { name: name.to_string(), expected, got: args.len() })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Value {
        Value::Symbol(s.to_string())
    }

    #[test]
    fn hd_of_list() {
        let list = Value::List(vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
        assert_eq!(hd(&list).unwrap(), Value::Int(10));
    }

    #[test]
    fn tl_of_empty_list_errors() {
        let empty = Value::List(vec![]);
        assert_eq!(tl(&empty).unwrap_err(), RuntimeError::TailOfEmptyList);
    }

    #[test]
    fn new_tail_finds_suffix_by_label() {
        let q = Value::List(vec![
            Value::List(vec![Value::Int(0)]),
            Value::List(vec![Value::Int(1)]),
            Value::List(vec![Value::Int(2)]),
            Value::List(vec![Value::Int(3)]),
        ]);
        let suffix = new_tail(&Value::Int(2), &q).unwrap();
        assert_eq!(suffix.as_list().unwrap().len(), 2);
    }

    #[test]
    fn is_done_checks_both_result_program_and_stack() {
        let result_program = Value::List(vec![Value::List(vec![sym("ack")])]);
        let active = Value::List(vec![sym("other")]);
        let code = Value::List(vec![result_program, active]);
        assert!(is_done(&Value::List(vec![sym("ack")]), &code).unwrap());
        assert!(is_done(&Value::List(vec![sym("other")]), &code).unwrap());
        assert!(!is_done(&Value::List(vec![sym("nope")]), &code).unwrap());
    }

    #[test]
    fn o_appends_and_finalises_on_terminal_instruction() {
        let header = Value::List(vec![Value::List(vec![sym("prog")])]);
        let active = Value::List(vec![sym("4-l-m")]);
        let code = Value::List(vec![header, active]);

        let instr = Value::List(vec![sym("goto"), sym("2")]);
        let code = o(code, instr).unwrap();

        let stack = code.into_list().unwrap();
        assert_eq!(stack.len(), 1, "active block should have been finalised");
        let result_program = stack[0].as_list().unwrap();
        assert_eq!(result_program.len(), 2);
    }

    #[test]
    fn joined_name_concatenates_with_underscore() {
        let label = Value::List(vec![sym("ack"), sym("m")]);
        assert_eq!(joined_name(&label).unwrap(), "ack_m");
    }
}
