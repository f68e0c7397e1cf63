//! Uplift (§4.9): translating a compile-time label or expression into
//! a run-time expression that, when evaluated by the specialiser,
//! yields a data representation of that label or expression in the
//! residual program.

use cogen_par::{Expr, Label};

use crate::delta::Delta;

fn quote(expr: Expr) -> Expr {
    Expr::Constant(Box::new(expr))
}

fn list_call(items: Vec<Expr>) -> Expr {
    Expr::PrimitiveCall { name: "list".into(), args: items }
}

/// `uplift(L)` -> `list('L, s1, s2, ...)` with `s_i` the sorted
/// members of the label's Δ.
pub fn uplift_label(label: &Label, delta: &Delta) -> Expr {
    let mut items = vec![quote(Expr::Symbol(label.name.clone()))];
    items.extend(delta.sorted_names().into_iter().map(|s| quote(Expr::Symbol(s))));
    list_call(items)
}

/// `uplift(e)` per §4.9's case analysis.
pub fn uplift_expr(expr: &Expr, delta: &Delta) -> Expr {
    match expr {
        Expr::Ident(name) => {
            if delta.contains(name) {
                list_call(vec![quote(Expr::Symbol("quote".into())), Expr::Ident(name.clone())])
            } else {
                quote(Expr::Symbol(name.clone()))
            }
        }
        Expr::Infix { op, left, right } => list_call(vec![
            quote(Expr::Symbol(op.clone())),
            uplift_expr(left, delta),
            uplift_expr(right, delta),
        ]),
        Expr::Prefix { op, expr } => {
            list_call(vec![quote(Expr::Symbol(op.clone())), uplift_expr(expr, delta)])
        }
        Expr::PrimitiveCall { name, args } => Expr::PrimitiveCall {
            name: name.clone(),
            args: args.iter().map(|a| uplift_expr(a, delta)).collect(),
        },
        // Integer/boolean literals, already-quoted symbols/constants,
        // list literals and call expressions are uplifted by quoting
        // their literal form verbatim (§4.9's "uplift(literal) ->
        // 'literal").
        other => quote(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogen_util::Span;

    fn label(name: &str) -> Label {
        Label::new(name, Span::DUMMY)
    }

    #[test]
    fn uplift_label_embeds_sorted_delta() {
        let mut delta = Delta::new();
        delta.insert("m");
        let e = uplift_label(&label("ack"), &delta);
        assert_eq!(e.to_string(), "list('ack, 'm)");
    }

    #[test]
    fn uplift_static_identifier_embeds_its_value() {
        let mut delta = Delta::new();
        delta.insert("m");
        let e = uplift_expr(&Expr::Ident("m".into()), &delta);
        assert_eq!(e.to_string(), "list('quote, m)");
    }

    #[test]
    fn uplift_dynamic_identifier_is_a_quoted_name() {
        let delta = Delta::new();
        let e = uplift_expr(&Expr::Ident("n".into()), &delta);
        assert_eq!(e.to_string(), "'n");
    }

    #[test]
    fn uplift_infix_builds_list_of_operator_and_operands() {
        let delta = Delta::new();
        let e = uplift_expr(
            &Expr::Infix {
                op: "+".into(),
                left: Box::new(Expr::Ident("n".into())),
                right: Box::new(Expr::Int(1)),
            },
            &delta,
        );
        assert_eq!(e.to_string(), "list('+, 'n, '1)");
    }
}
