//! The trace builder: a single-pass simulation from the start codel that
//! produces one linear, branch-free `Program`. Where the
//! teacher's compiler explored every reachable `(Position, Direction,
//! CodelChooser)` state with a BFS and built a position-indexed graph, this
//! walks the grid exactly once, emitting instructions as it goes, and stops
//! the first time it would revisit a `(shape, Dp, Cc)` state — a Piet
//! program that loops forever compiles to a trace that halts where the loop
//! was first detected rather than to an unbounded program.
//!
//! The builder carries its own abstract `Stack`, mirroring exactly what a
//! live interpreter's stack would hold at each point (no `NumIn`/`CharIn` can
//! appear in a traced program, so every value is knowable ahead of time).
//! This abstract stack is what lets a `Pointer`/`Switch` transition — which
//! in real Piet rotates Dp or toggles Cc by a value popped at *run* time —
//! still be resolved once, statically, at *build* time: the builder pops its
//! own mirrored value, pre-applies the rotation to its local Dp/Cc, and
//! keeps walking from there.

use std::collections::HashSet;

use crate::bytecode::{Instruction, Program, ProgramMetadata};
use crate::error::VmError;
use crate::exits::{Cc, Dp, Position};
use crate::grid::ShapeTable;
use crate::navigator::{Navigator, StepOutcome};
use crate::ops::{op_from_transition, Op};
use crate::stack::Stack;

/// Defensive cap on trace length, in case grid topology somehow defeats the
/// visited-state loop guard; no legitimate program should approach this.
const MAX_TRACE_STEPS: usize = 1_000_000;

/// Walk `table` from `(0, 0)` with the canonical initial Dp/Cc and return the
/// resulting program. `capacity` sizes the abstract stack the builder
/// mirrors alongside emission — pass the same capacity the program will
/// later be interpreted (or assembled) with, so a build-time overflow lines
/// up with what run time would actually see.
///
/// Fails with `UnsupportedOp` if the trace would ever need to emit `NumIn`
/// or `CharIn`: a program that reads input has no build-time-knowable
/// values, so this builder — which statically resolves every `Pointer`/
/// `Switch` rotation in advance — cannot trace past it.
pub fn build_trace(table: &ShapeTable, capacity: usize) -> Result<Program, VmError> {
    let navigator = Navigator::new(table);
    let mut program = Program::with_metadata(ProgramMetadata {
        grid_width: table.width(),
        grid_height: table.height(),
        codel_size: 1,
    });
    let mut abstract_stack = Stack::new(capacity);
    log::debug!(
        "tracing program over a {}x{} shape table ({} shapes)",
        table.width(),
        table.height(),
        table.shapes().len()
    );

    let mut pos = Position::new(0, 0);
    let mut dp = Dp::Right;
    let mut cc = Cc::Left;
    let mut visited_shape_states: HashSet<(usize, Dp, Cc)> = HashSet::new();

    for _ in 0..MAX_TRACE_STEPS {
        let Some(color) = table.color_at(pos) else {
            program.push_instruction(Instruction::new(Op::Exit));
            return Ok(program);
        };

        if color.is_obstacle() {
            program.push_instruction(Instruction::new(Op::Exit));
            return Ok(program);
        }

        if color.is_white() {
            match resolve_white_slide(&navigator, &mut program, &mut abstract_stack, pos, dp, cc) {
                Some((next, new_dp, new_cc)) => {
                    pos = next;
                    dp = new_dp;
                    cc = new_cc;
                    continue;
                }
                None => return Ok(program),
            }
        }

        let shape_id = table
            .shape_id_at(pos)
            .expect("a non-white, non-obstacle codel belongs to a chromatic shape");

        if !visited_shape_states.insert((shape_id, dp, cc)) {
            program.push_instruction(Instruction::new(Op::Exit));
            return Ok(program);
        }

        match resolve_chromatic_exit(&navigator, &mut program, &mut abstract_stack, pos, dp, cc) {
            Some((outcome, exit_dp, exit_cc)) => {
                let (next_pos, dst_color) = match outcome {
                    StepOutcome::Colored(p) | StepOutcome::White(p) => {
                        (p, table.color_at(p).expect("step landed in bounds"))
                    }
                    StepOutcome::Blocked => unreachable!("resolve_chromatic_exit never returns Blocked"),
                };

                let op = op_from_transition(color, dst_color);
                if matches!(op, Op::NumIn | Op::CharIn) {
                    return Err(VmError::UnsupportedOp(op));
                }

                let block_size = table.shape(shape_id).size as i32;
                let (new_dp, new_cc, emit_op) =
                    apply_chromatic_op(op, &mut abstract_stack, exit_dp, exit_cc, block_size);

                if op != Op::Noop {
                    let instr = if emit_op == Op::Push {
                        Instruction::push(block_size)
                    } else {
                        Instruction::new(emit_op)
                    };
                    program.push_instruction(instr);
                }

                pos = next_pos;
                dp = new_dp;
                cc = new_cc;
            }
            None => return Ok(program),
        }
    }

    Ok(program)
}

/// Apply a color-transition opcode's abstract-stack effect and, for
/// `Pointer`/`Switch`, its effect on the builder's own Dp/Cc. Returns the
/// (possibly updated) Dp/Cc and the opcode to actually emit — identical to
/// `op` for everything except `Pointer`/`Switch`, which swap: the builder
/// emits `Call(Pointer)` when the *semantics* it just resolved was a Switch,
/// and `Call(Switch)` when the semantics was a Pointer. This is a
/// deliberate, faithfully-preserved quirk of the contract this builder
/// implements (see the Trace builder design notes): it is harmless because
/// neither back end ever re-derives navigation from Dp/Cc inside an already
/// linearized program — both backends just drop the one stack word either
/// opcode consumes.
fn apply_chromatic_op(op: Op, stack: &mut Stack, dp: Dp, cc: Cc, block_size: i32) -> (Dp, Cc, Op) {
    match op {
        Op::Push => {
            let _ = stack.push(block_size);
            (dp, cc, Op::Push)
        }
        Op::Pop => {
            stack.pop();
            (dp, cc, Op::Pop)
        }
        Op::Add => {
            binary_op(stack, |a, b| a.wrapping_add(b));
            (dp, cc, Op::Add)
        }
        Op::Sub => {
            binary_op(stack, |a, b| a.wrapping_sub(b));
            (dp, cc, Op::Sub)
        }
        Op::Mult => {
            binary_op(stack, |a, b| a.wrapping_mul(b));
            (dp, cc, Op::Mult)
        }
        Op::Div => {
            checked_binary_op(stack, |a, b| if b == 0 { None } else { Some(a.wrapping_div(b)) });
            (dp, cc, Op::Div)
        }
        Op::Mod => {
            checked_binary_op(stack, |a, b| if b == 0 { None } else { Some(a.rem_euclid(b)) });
            (dp, cc, Op::Mod)
        }
        Op::Not => {
            if let Some(v) = stack.pop() {
                let _ = stack.push(if v == 0 { 1 } else { 0 });
            }
            (dp, cc, Op::Not)
        }
        Op::Greater => {
            binary_op(stack, |a, b| if a > b { 1 } else { 0 });
            (dp, cc, Op::Greater)
        }
        Op::Dup => {
            let _ = stack.dup();
            (dp, cc, Op::Dup)
        }
        Op::Roll => {
            if let Some((rolls, depth)) = stack.pop2() {
                stack.roll(depth, rolls);
            }
            (dp, cc, Op::Roll)
        }
        Op::NumOut | Op::CharOut => {
            stack.pop();
            (dp, cc, op)
        }
        Op::Switch => {
            let mut next_cc = cc;
            if let Some(v) = stack.pop() {
                if v.rem_euclid(2) == 1 {
                    next_cc = cc.toggle();
                }
            }
            (dp, next_cc, Op::Pointer)
        }
        Op::Pointer => {
            let mut next_dp = dp;
            if let Some(v) = stack.pop() {
                next_dp = dp.rotate(v);
            }
            (next_dp, cc, Op::Switch)
        }
        Op::Noop => (dp, cc, Op::Noop),
        Op::NumIn | Op::CharIn | Op::Exit => {
            unreachable!("NumIn/CharIn are rejected before this point; Exit never comes from a transition")
        }
    }
}

/// `pop2()` returns `(top, next)`; every binary opcode computes `next op
/// top` — matching the interpreter's own convention (§4.8) so the abstract
/// stack and the real runtime stack always agree.
fn binary_op(stack: &mut Stack, f: impl Fn(i32, i32) -> i32) {
    if let Some((top, next)) = stack.pop2() {
        let _ = stack.push(f(next, top));
    }
}

fn checked_binary_op(stack: &mut Stack, f: impl Fn(i32, i32) -> Option<i32>) {
    if let Some((top, next)) = stack.pop2() {
        match f(next, top) {
            Some(result) => {
                let _ = stack.push(result);
            }
            None => {
                let _ = stack.push(next);
                let _ = stack.push(top);
            }
        }
    }
}

/// Find an exit from the chromatic shape at `pos`, toggling Cc first and
/// then rotating Dp on alternate attempts, up to 8 tries — matching the
/// teacher's own `find_valid_exit`, which also toggles CC on the first
/// retry before ever rotating DP. Every failed attempt emits a `Push 1`
/// followed by the opcode that performs that attempt's rotation at runtime,
/// so the compiled program reproduces the same state changes a live
/// interpreter would make while searching. The pushed value is always
/// exactly 1, so the rotation it drives is hardcoded here rather than
/// re-read off the abstract stack; it's still pushed and popped there for
/// bookkeeping symmetry with every other instruction this builder emits.
/// After 8 straight failures an `Exit` is emitted and `None` is
/// returned: this shape is an unconditional dead end.
fn resolve_chromatic_exit(
    navigator: &Navigator,
    program: &mut Program,
    stack: &mut Stack,
    pos: Position,
    mut dp: Dp,
    mut cc: Cc,
) -> Option<(StepOutcome, Dp, Cc)> {
    let mut attempts = 8;
    loop {
        match navigator.step(pos, dp, cc) {
            StepOutcome::Blocked => {}
            outcome => return Some((outcome, dp, cc)),
        }

        program.push_instruction(Instruction::push(1));
        let _ = stack.push(1);
        attempts -= 1;
        if attempts % 2 == 1 {
            program.push_instruction(Instruction::new(Op::Switch));
            stack.pop();
            cc = cc.toggle();
        } else {
            program.push_instruction(Instruction::new(Op::Pointer));
            stack.pop();
            dp = dp.rotate(1);
        }

        if attempts == 0 {
            program.push_instruction(Instruction::new(Op::Exit));
            return None;
        }
    }
}

/// Retry a blocked white slide by rotating Cc and Dp together, since a
/// blocked slide needs both before the next attempt means anything. Each
/// burst is `Push 1; Dup; Switch; Pointer`: the duplicated
/// 1 feeds both the Switch (toggles Cc) and the Pointer (rotates Dp) so one
/// emitted burst performs one full rotation step, consuming two of the
/// shared 8-attempt budget. Four bursts exhaust it.
fn resolve_white_slide(
    navigator: &Navigator,
    program: &mut Program,
    stack: &mut Stack,
    pos: Position,
    mut dp: Dp,
    mut cc: Cc,
) -> Option<(Position, Dp, Cc)> {
    let mut attempts = 8;
    loop {
        if let StepOutcome::Colored(next) = navigator.slide_white(pos, dp) {
            return Some((next, dp, cc));
        }

        program.push_instruction(Instruction::push(1));
        let _ = stack.push(1);
        program.push_instruction(Instruction::new(Op::Dup));
        let _ = stack.dup();
        program.push_instruction(Instruction::new(Op::Switch));
        stack.pop();
        program.push_instruction(Instruction::new(Op::Pointer));
        stack.pop();
        cc = cc.toggle();
        dp = dp.rotate(1);

        attempts -= 2;
        if attempts <= 0 {
            program.push_instruction(Instruction::new(Op::Exit));
            return None;
        }
    }
}
