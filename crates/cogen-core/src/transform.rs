//! The binding-time-driven program transformer (§4.4–§4.8): the core
//! of this system. Consumes a parsed program and an initial Δ and
//! produces the *extension* — a new flowchart program that, when
//! interpreted, performs specialisation.

use cogen_par::{Block, Expr, Label, Program, Rhs, Stmt};
use cogen_util::Span;
use tracing::{debug, trace};

use crate::delta::Delta;
use crate::error::{TransformError, TransformResult};
use crate::label::{self, BODY, COPY, ENTRY, GUARD, INIT, TERMINAL};
use crate::uplift::{uplift_expr, uplift_label};

fn quote_symbol(s: impl Into<String>) -> Expr {
    Expr::Constant(Box::new(Expr::Symbol(s.into())))
}

fn list_call(items: Vec<Expr>) -> Expr {
    Expr::PrimitiveCall { name: "list".into(), args: items }
}

/// Build the residual-AST-as-data encoding of `x := rhs'`, consumed
/// at run time by `cogen_core::interpreter`'s reconstruction path.
fn underline_assign(name: &str, rhs_uplifted: Expr) -> Expr {
    list_call(vec![quote_symbol(name), quote_symbol(":="), rhs_uplifted])
}

fn underline_call(name: &str, label_uplifted: Expr) -> Expr {
    let call_form = list_call(vec![quote_symbol("call"), label_uplifted]);
    list_call(vec![quote_symbol(name), quote_symbol(":="), call_form])
}

fn underline_if(cond_uplifted: Expr, label_true_uplifted: Expr, label_false_uplifted: Expr) -> Expr {
    list_call(vec![quote_symbol("if"), cond_uplifted, label_true_uplifted, label_false_uplifted])
}

fn underline_return(value_uplifted: Expr) -> Expr {
    list_call(vec![quote_symbol("return"), value_uplifted])
}

fn code_ident() -> Expr {
    Expr::Ident("code".into())
}

pub struct Transformer {
    source: Program,
    extension: Program,
}

impl Transformer {
    pub fn new(source: Program) -> Self {
        let extension = Program { name: source.name.clone(), params: source.params.clone(), blocks: Vec::new() };
        Self { source, extension }
    }

    /// Entry point: §4.8's header generation followed by specialising
    /// the program's first block under the given initial Δ.
    pub fn transform(mut self, mut delta: Delta) -> TransformResult<Program> {
        let entry_block = self
            .source
            .blocks
            .first()
            .cloned()
            .ok_or_else(|| TransformError::EmptyBlock { label: "<program>".into() })?;
        let l0 = entry_block.label;

        // The extension is invoked with the *static* values (it is the
        // specialiser); the dynamic ones are only bound later, when the
        // residual program it produces is itself run.
        self.extension.params = self.source.params.iter().filter(|p| delta.contains(p)).cloned().collect();

        let dynamic_vars: Vec<String> =
            self.source.params.iter().filter(|p| !delta.contains(p)).cloned().collect();
        let l0_uplifted = uplift_label(&l0, &delta);
        let mut newheader_args: Vec<Expr> = dynamic_vars.iter().map(|v| Expr::Ident(v.clone())).collect();
        newheader_args.push(l0_uplifted);

        let entry_label = label::new_label(ENTRY, &l0.name, &delta);
        let guard_for_l0 = label::new_label(GUARD, &l0.name, &delta);
        let entry_stmts = vec![
            Stmt::Assign {
                name: "code".into(),
                rhs: Rhs::Expr(Expr::PrimitiveCall { name: "newheader".into(), args: newheader_args }),
                span: Span::DUMMY,
            },
            Stmt::Goto { label: Label::new(guard_for_l0, Span::DUMMY), span: Span::DUMMY },
        ];
        // The entry block must be the extension's first block (§3,
        // invariant 3): the interpreter starts from `blocks.first()`.
        self.create_block(entry_label, entry_stmts);

        self.create_block(TERMINAL.to_string(), vec![Stmt::Return { value: code_ident(), span: Span::DUMMY }]);

        debug!(label = %l0.name, delta = %delta, "starting transform");
        self.process_poly(&l0.name, &delta)?;

        Ok(self.extension)
    }

    fn create_block(&mut self, label: String, stmts: Vec<Stmt>) {
        self.extension.blocks.push(Block::new(Label::new(label, Span::DUMMY), stmts, Span::DUMMY));
    }

    fn append_stmt(&mut self, cursor: &str, stmt: Stmt) {
        let block = self
            .extension
            .find_block_mut(cursor)
            .unwrap_or_else(|| panic!("cursor block '{cursor}' does not exist in extension"));
        block.stmts.push(stmt);
    }

    /// `processPoly` (§4.5): guarantee the guard/init/body triple for
    /// `(orig_label, delta)` exists, memoised on the guard's presence.
    fn process_poly(&mut self, orig_label: &str, delta: &Delta) -> TransformResult<()> {
        let guard = label::new_label(GUARD, orig_label, delta);
        if label::exists_label(&self.extension, &guard) {
            trace!(label = %guard, "processPoly memoised, skipping");
            return Ok(());
        }

        let init = label::new_label(INIT, orig_label, delta);
        let body = label::new_label(BODY, orig_label, delta);
        let label_uplifted = uplift_label(&Label::new(orig_label.to_string(), Span::DUMMY), delta);

        let guard_stmt = Stmt::If {
            cond: Expr::PrimitiveCall {
                name: "is_done".into(),
                args: vec![label_uplifted.clone(), code_ident()],
            },
            label_true: Label::new(TERMINAL.to_string(), Span::DUMMY),
            label_false: Label::new(init.clone(), Span::DUMMY),
            span: Span::DUMMY,
        };
        self.create_block(guard, vec![guard_stmt]);

        let init_stmts = vec![
            Stmt::Assign {
                name: "code".into(),
                rhs: Rhs::Expr(Expr::PrimitiveCall {
                    name: "newblock".into(),
                    args: vec![code_ident(), label_uplifted],
                }),
                span: Span::DUMMY,
            },
            Stmt::Goto { label: Label::new(body.clone(), Span::DUMMY), span: Span::DUMMY },
        ];
        self.create_block(init, init_stmts);

        self.create_block(body.clone(), Vec::new());
        let src_block = self
            .source
            .find_block(orig_label)
            .cloned()
            .ok_or_else(|| TransformError::UndefinedLabel { label: orig_label.into(), from: body.clone() })?;
        let mut body_delta = delta.clone();
        self.process_body(&src_block.stmts, &mut body_delta, &body)
    }

    /// `processBlock` (§4.6's static-if case): ensure the full
    /// guard/init/body machinery exists for `orig_label` under
    /// `delta` (memoised via `processPoly`, so a block reached both
    /// through a static `if` and a dynamic call site is only ever
    /// processed once), and return its `4-*` body label as the jump
    /// target — the static `if`'s arms jump straight into the
    /// specialised body, not through the guard/init dispatch.
    fn process_block(&mut self, orig_label: &str, delta: &Delta) -> TransformResult<Label> {
        self.process_poly(orig_label, delta)?;
        Ok(Label::new(label::new_label(BODY, orig_label, delta), Span::DUMMY))
    }

    /// `processBody` (§4.6): iterate a source block's statements,
    /// classifying each as static/dynamic and appending the
    /// corresponding extension code at `cursor`.
    fn process_body(&mut self, stmts: &[Stmt], delta: &mut Delta, cursor: &str) -> TransformResult<()> {
        let Some((last, init)) = stmts.split_last() else {
            return Err(TransformError::EmptyBlock { label: cursor.into() });
        };

        for stmt in init {
            match stmt {
                Stmt::Assign { name, rhs, .. } => self.process_assignment(name, rhs, delta, cursor)?,
                other => {
                    return Err(TransformError::NonAssignmentBeforeJump {
                        label: cursor.into(),
                        statement: other.to_string(),
                    })
                }
            }
        }

        match last {
            Stmt::Assign { .. } => Err(TransformError::NonTerminalJump {
                label: cursor.into(),
                statement: last.to_string(),
            }),
            Stmt::Goto { label, .. } => {
                // Inlined (§4.6): no Δ snapshot/restore, straight-line
                // flow merges across the goto boundary.
                let target = self
                    .source
                    .find_block(&label.name)
                    .cloned()
                    .ok_or_else(|| TransformError::UndefinedLabel {
                        label: label.name.clone(),
                        from: cursor.into(),
                    })?;
                self.process_body(&target.stmts, delta, cursor)
            }
            Stmt::If { cond, label_true, label_false, .. } => {
                self.process_if(cond, label_true, label_false, delta, cursor)
            }
            Stmt::Return { value, .. } => self.process_return(value, delta, cursor),
            Stmt::Expr { .. } => Err(TransformError::NonTerminalJump {
                label: cursor.into(),
                statement: last.to_string(),
            }),
        }
    }

    fn process_assignment(&mut self, name: &str, rhs: &Rhs, delta: &mut Delta, cursor: &str) -> TransformResult<()> {
        match rhs {
            Rhs::Expr(expr) => {
                let free = expr.free_identifiers();
                if delta.is_superset_of(&free) {
                    self.append_stmt(
                        cursor,
                        Stmt::Assign { name: name.into(), rhs: Rhs::Expr(expr.clone()), span: Span::DUMMY },
                    );
                    delta.insert(name);
                } else {
                    let uplifted = uplift_expr(expr, delta);
                    let instr = underline_assign(name, uplifted);
                    self.emit_code_update(cursor, instr);
                    delta.remove(name);
                }
                Ok(())
            }
            Rhs::Call { label, args } => {
                if delta.is_superset_of(args) {
                    let copied = self.copy_block(&label.name, delta)?;
                    self.append_stmt(
                        cursor,
                        Stmt::Assign {
                            name: name.into(),
                            rhs: Rhs::Call { label: Label::new(copied, Span::DUMMY), args: Vec::new() },
                            span: Span::DUMMY,
                        },
                    );
                    delta.insert(name);
                } else {
                    self.process_poly(&label.name, delta)?;
                    let guard = label::new_label(GUARD, &label.name, delta);
                    self.append_stmt(
                        cursor,
                        Stmt::Assign {
                            name: "code".into(),
                            rhs: Rhs::Call { label: Label::new(guard, Span::DUMMY), args: Vec::new() },
                            span: Span::DUMMY,
                        },
                    );
                    let label_uplifted = uplift_label(label, delta);
                    let instr = underline_call(name, label_uplifted);
                    self.emit_code_update(cursor, instr);
                    delta.remove(name);
                }
                Ok(())
            }
        }
    }

    fn emit_code_update(&mut self, cursor: &str, instr: Expr) {
        self.append_stmt(
            cursor,
            Stmt::Assign {
                name: "code".into(),
                rhs: Rhs::Expr(Expr::PrimitiveCall { name: "o".into(), args: vec![code_ident(), instr] }),
                span: Span::DUMMY,
            },
        );
    }

    fn process_if(
        &mut self,
        cond: &Expr,
        label_true: &Label,
        label_false: &Label,
        delta: &mut Delta,
        cursor: &str,
    ) -> TransformResult<()> {
        let free = cond.free_identifiers();
        if delta.is_superset_of(&free) {
            let snapshot = delta.snapshot();
            let lt = self.process_block(&label_true.name, delta)?;
            delta.restore(snapshot.clone());
            let lf = self.process_block(&label_false.name, delta)?;
            delta.restore(snapshot);
            self.append_stmt(
                cursor,
                Stmt::If { cond: cond.clone(), label_true: lt, label_false: lf, span: Span::DUMMY },
            );
        } else {
            let snapshot = delta.snapshot();
            self.process_poly(&label_true.name, delta)?;
            delta.restore(snapshot.clone());
            // Corrected reading (§9 open question): the false branch
            // is processed here, not a second copy of the true branch.
            self.process_poly(&label_false.name, delta)?;
            delta.restore(snapshot);

            let lt_guard = label::new_label(GUARD, &label_true.name, delta);
            let lf_guard = label::new_label(GUARD, &label_false.name, delta);
            self.append_stmt(
                cursor,
                Stmt::Assign {
                    name: "code".into(),
                    rhs: Rhs::Call { label: Label::new(lt_guard, Span::DUMMY), args: Vec::new() },
                    span: Span::DUMMY,
                },
            );
            self.append_stmt(
                cursor,
                Stmt::Assign {
                    name: "code".into(),
                    rhs: Rhs::Call { label: Label::new(lf_guard, Span::DUMMY), args: Vec::new() },
                    span: Span::DUMMY,
                },
            );
            let instr = underline_if(
                uplift_expr(cond, delta),
                uplift_label(label_true, delta),
                uplift_label(label_false, delta),
            );
            self.append_stmt(
                cursor,
                Stmt::Return {
                    value: Expr::PrimitiveCall { name: "o".into(), args: vec![code_ident(), instr] },
                    span: Span::DUMMY,
                },
            );
        }
        Ok(())
    }

    fn process_return(&mut self, value: &Expr, delta: &Delta, cursor: &str) -> TransformResult<()> {
        let instr = underline_return(uplift_expr(value, delta));
        self.append_stmt(
            cursor,
            Stmt::Return {
                value: Expr::PrimitiveCall { name: "o".into(), args: vec![code_ident(), instr] },
                span: Span::DUMMY,
            },
        );
        Ok(())
    }

    /// `5-*` block copying (§4.7): deep-clone `orig_label` and every
    /// block transitively reachable through `if`/`goto`/`call`
    /// targets, memoised on the copy's label.
    fn copy_block(&mut self, orig_label: &str, delta: &Delta) -> TransformResult<String> {
        let target = label::new_label(COPY, orig_label, delta);
        if label::exists_label(&self.extension, &target) {
            return Ok(target);
        }

        let src_block = self
            .source
            .find_block(orig_label)
            .cloned()
            .ok_or_else(|| TransformError::UndefinedLabel { label: orig_label.into(), from: target.clone() })?;

        // Placeholder first, so a cyclic goto/if graph terminates.
        self.create_block(target.clone(), Vec::new());

        let mut rewritten = Vec::with_capacity(src_block.stmts.len());
        for stmt in &src_block.stmts {
            rewritten.push(self.rewrite_copied_stmt(stmt, delta)?);
        }
        self.extension.find_block_mut(&target).unwrap().stmts = rewritten;

        Ok(target)
    }

    fn rewrite_copied_stmt(&mut self, stmt: &Stmt, delta: &Delta) -> TransformResult<Stmt> {
        Ok(match stmt {
            Stmt::Goto { label, span } => {
                let copied = self.copy_block(&label.name, delta)?;
                Stmt::Goto { label: Label::new(copied, Span::DUMMY), span: *span }
            }
            Stmt::If { cond, label_true, label_false, span } => {
                let lt = self.copy_block(&label_true.name, delta)?;
                let lf = self.copy_block(&label_false.name, delta)?;
                Stmt::If {
                    cond: cond.clone(),
                    label_true: Label::new(lt, Span::DUMMY),
                    label_false: Label::new(lf, Span::DUMMY),
                    span: *span,
                }
            }
            Stmt::Return { value, span } => Stmt::Return { value: value.clone(), span: *span },
            Stmt::Assign { name, rhs, span } => {
                let rhs = match rhs {
                    Rhs::Expr(e) => Rhs::Expr(e.clone()),
                    Rhs::Call { label, args } => {
                        let copied = self.copy_block(&label.name, delta)?;
                        Rhs::Call { label: Label::new(copied, Span::DUMMY), args: args.clone() }
                    }
                };
                Stmt::Assign { name: name.clone(), rhs, span: *span }
            }
            Stmt::Expr { expr, span } => Stmt::Expr { expr: expr.clone(), span: *span },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogen_par::parse;

    const ACKERMANN: &str = "ack (m, n);\n\
        ack: if m = 0 goto done else next;\n\
        next: if n = 0 goto ack0 else ack1;\n\
        done: return n + 1;\n\
        ack0: n := 1; goto ack2;\n\
        ack1: n := n - 1; n := call ack m n; goto ack2;\n\
        ack2: m := m - 1; n := call ack m n; return n;\n";

    fn parse_ok(src: &str) -> Program {
        let (program, errors) = parse(src);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        program
    }

    #[test]
    fn ackermann_delta_m_produces_expected_guard_init_body_trio() {
        let program = parse_ok(ACKERMANN);
        let mut delta = Delta::new();
        delta.insert("m");
        let extension = Transformer::new(program).transform(delta).expect("transform should succeed");

        assert!(extension.has_label("0-ack-m"));
        assert!(extension.has_label("1-ack-m"));
        assert!(extension.has_label("3-ack-m"));
        assert!(extension.has_label("4-ack-m"));
        assert!(extension.has_label("2"));

        let body = extension.find_block("4-ack-m").unwrap();
        let stringified: Vec<String> = body.stmts.iter().map(|s| s.to_string()).collect();
        assert!(stringified.iter().any(|s| s.contains("4-done-m") && s.contains("4-next-m")));
    }

    #[test]
    fn every_label_referenced_exists_in_extension() {
        let program = parse_ok(ACKERMANN);
        let mut delta = Delta::new();
        delta.insert("m");
        let extension = Transformer::new(program).transform(delta).unwrap();

        for block in &extension.blocks {
            for stmt in &block.stmts {
                match stmt {
                    Stmt::Goto { label, .. } => assert!(extension.has_label(&label.name), "missing {}", label.name),
                    Stmt::If { label_true, label_false, .. } => {
                        assert!(extension.has_label(&label_true.name));
                        assert!(extension.has_label(&label_false.name));
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn no_two_blocks_share_a_label() {
        let program = parse_ok(ACKERMANN);
        let mut delta = Delta::new();
        delta.insert("m");
        let extension = Transformer::new(program).transform(delta).unwrap();

        let mut seen = std::collections::HashSet::new();
        for block in &extension.blocks {
            assert!(seen.insert(block.label.name.clone()), "duplicate label {}", block.label.name);
        }
    }

    #[test]
    fn transforming_twice_is_deterministic() {
        let program = parse_ok(ACKERMANN);
        let mut delta1 = Delta::new();
        delta1.insert("m");
        let mut delta2 = Delta::new();
        delta2.insert("m");

        let ext1 = Transformer::new(program.clone()).transform(delta1).unwrap();
        let ext2 = Transformer::new(program).transform(delta2).unwrap();

        assert_eq!(ext1.to_string(), ext2.to_string());
    }

    #[test]
    fn empty_delta_still_produces_a_terminal_and_entry_block() {
        let program = parse_ok(ACKERMANN);
        let extension = Transformer::new(program).transform(Delta::new()).unwrap();
        assert!(extension.has_label("2"));
        assert!(extension.has_label("0-ack"));
    }
}
