//! Walks a `Program` instruction-by-instruction against a live `Stack`,
//! `Dp`, and `Cc`. All arithmetic, I/O, `Pointer`/`Switch`
//! consumption, `Roll`, and `Exit` side effects happen here — the trace
//! builder only ever predicts them statically.

use std::io::{Read, Write};

use crate::bytecode::{Instruction, Program};
use crate::error::VmError;
use crate::exits::{Cc, Dp};
use crate::io::{Input, Output};
use crate::ops::Op;
use crate::stack::Stack;

/// How the interpreter's run ended. `Exit` is the only opcode that produces
/// this; an interpreter given a well-formed `Program` (one built by
/// `build_trace`, which always ends in `Exit`) always reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halted;

pub struct Interpreter<R: Read, W: Write> {
    program: Program,
    pc: usize,
    stack: Stack,
    dp: Dp,
    cc: Cc,
    input: Input<R>,
    output: Output<W>,
}

impl<R: Read, W: Write> Interpreter<R, W> {
    pub fn new(program: Program, capacity: usize, input: R, output: W) -> Self {
        Self {
            program,
            pc: 0,
            stack: Stack::new(capacity),
            dp: Dp::Right,
            cc: Cc::Left,
            input: Input::new(input),
            output: Output::new(output),
        }
    }

    pub fn dp(&self) -> Dp {
        self.dp
    }

    pub fn cc(&self) -> Cc {
        self.cc
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    /// Runs every instruction in the program in order. Returns once `Exit`
    /// is reached, after writing the terminating newline. A
    /// library caller gets this clean `Halted` result instead of an actual
    /// process exit — the CLI front end performs that.
    pub fn run(&mut self) -> Result<Halted, VmError> {
        loop {
            let Some(instr) = self.program.instructions.get(self.pc).copied() else {
                return Ok(Halted);
            };
            self.pc += 1;

            if let Some(halted) = self.execute(instr)? {
                return Ok(halted);
            }
        }
    }

    /// Executes one instruction. Returns `Some(Halted)` only for `Exit`.
    fn execute(&mut self, instr: Instruction) -> Result<Option<Halted>, VmError> {
        match instr.op {
            Op::Push => {
                let value = instr.imm.expect("Push always carries an immediate");
                self.stack.push(value)?;
            }
            Op::Pop => {
                self.stack.pop();
            }
            Op::Add => self.binary_op(|a, b| a.wrapping_add(b)),
            Op::Sub => self.binary_op(|a, b| a.wrapping_sub(b)),
            Op::Mult => self.binary_op(|a, b| a.wrapping_mul(b)),
            Op::Div => self.checked_binary_op(|a, b| if b == 0 { None } else { Some(a.wrapping_div(b)) }),
            Op::Mod => self.checked_binary_op(|a, b| if b == 0 { None } else { Some(a.rem_euclid(b)) }),
            Op::Not => {
                if let Some(v) = self.stack.pop() {
                    self.stack.push(if v == 0 { 1 } else { 0 })?;
                }
            }
            Op::Greater => self.binary_op(|a, b| if a > b { 1 } else { 0 }),
            Op::Pointer => {
                if let Some(v) = self.stack.pop() {
                    self.dp = self.dp.rotate(v);
                }
            }
            Op::Switch => {
                if let Some(v) = self.stack.pop() {
                    if v.rem_euclid(2) == 1 {
                        self.cc = self.cc.toggle();
                    }
                }
            }
            Op::Dup => self.stack.dup()?,
            Op::Roll => {
                if let Some((rolls, depth)) = self.stack.pop2() {
                    self.stack.roll(depth, rolls);
                }
            }
            Op::NumIn => {
                let value = self.input.read_number()?;
                self.stack.push(value)?;
            }
            Op::CharIn => {
                let value = self.input.read_char()?;
                self.stack.push(value)?;
            }
            Op::NumOut => {
                if let Some(v) = self.stack.pop() {
                    self.output.write_number(v)?;
                }
            }
            Op::CharOut => {
                if let Some(v) = self.stack.pop() {
                    self.output.write_char(v)?;
                }
            }
            Op::Noop => {}
            Op::Exit => {
                self.output.write_newline()?;
                return Ok(Some(Halted));
            }
        }
        Ok(None)
    }

    /// `pop2()` returns `(top, next)`; `Add`/`Sub`/`Mult`/`Div`/`Mod`/
    /// `Greater` compute `b op a` where `a` is the top and `b` is the one
    /// beneath it, so the pushed result is `f(next, top)`.
    fn binary_op(&mut self, f: impl Fn(i32, i32) -> i32) {
        if let Some((top, next)) = self.stack.pop2() {
            let _ = self.stack.push(f(next, top));
        }
    }

    fn checked_binary_op(&mut self, f: impl Fn(i32, i32) -> Option<i32>) {
        if let Some((top, next)) = self.stack.pop2() {
            match f(next, top) {
                Some(result) => {
                    let _ = self.stack.push(result);
                }
                None => {
                    // Division/modulo by zero: Piet has no defined behavior
                    // here; treat it the same as any other routine stack
                    // fault and leave the stack as it was.
                    let _ = self.stack.push(next);
                    let _ = self.stack.push(top);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Instruction;

    #[test]
    fn push_and_add_leave_the_sum_on_the_stack() {
        let mut program = Program::new();
        program.push_instruction(Instruction::push(3));
        program.push_instruction(Instruction::push(4));
        program.push_instruction(Instruction::new(Op::Add));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
        interp.run().unwrap();
        assert_eq!(interp.stack().as_slice(), &[7]);
    }

    #[test]
    fn sub_preserves_operand_order() {
        // Push(10), Push(3): top=3, next=10; Sub computes next - top = 7.
        let mut program = Program::new();
        program.push_instruction(Instruction::push(10));
        program.push_instruction(Instruction::push(3));
        program.push_instruction(Instruction::new(Op::Sub));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
        interp.run().unwrap();
        assert_eq!(interp.stack().as_slice(), &[7]);
    }

    #[test]
    fn char_out_writes_the_pushed_codepoint() {
        let mut program = Program::new();
        program.push_instruction(Instruction::push('H' as i32));
        program.push_instruction(Instruction::new(Op::CharOut));
        program.push_instruction(Instruction::push('i' as i32));
        program.push_instruction(Instruction::new(Op::CharOut));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
        interp.run().unwrap();
        let out = interp.into_output();
        assert_eq!(String::from_utf8(out).unwrap(), "Hi\n");
    }

    #[test]
    fn stack_underflow_is_a_silent_noop() {
        let mut program = Program::new();
        program.push_instruction(Instruction::new(Op::Pop));
        program.push_instruction(Instruction::new(Op::Add));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
        assert!(interp.run().is_ok());
        assert!(interp.stack().is_empty());
    }

    #[test]
    fn stack_overflow_is_fatal() {
        let mut program = Program::new();
        program.push_instruction(Instruction::push(1));
        program.push_instruction(Instruction::push(2));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, 1, "".as_bytes(), Vec::new());
        assert!(matches!(interp.run(), Err(VmError::StackOverflow)));
    }

    #[test]
    fn num_in_reads_from_the_input_stream() {
        let mut program = Program::new();
        program.push_instruction(Instruction::new(Op::NumIn));
        program.push_instruction(Instruction::push(1));
        program.push_instruction(Instruction::new(Op::Add));
        program.push_instruction(Instruction::new(Op::NumOut));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "41".as_bytes(), Vec::new());
        interp.run().unwrap();
        let out = interp.into_output();
        assert_eq!(String::from_utf8(out).unwrap(), "42\n");
    }

    #[test]
    fn pointer_rotates_dp_by_the_popped_value() {
        let mut program = Program::new();
        program.push_instruction(Instruction::push(2));
        program.push_instruction(Instruction::new(Op::Pointer));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
        interp.run().unwrap();
        assert_eq!(interp.dp(), Dp::Left);
    }

    #[test]
    fn switch_toggles_cc_only_on_odd_values() {
        let mut program = Program::new();
        program.push_instruction(Instruction::push(1));
        program.push_instruction(Instruction::new(Op::Switch));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
        interp.run().unwrap();
        assert_eq!(interp.cc(), Cc::Right);
    }

    #[test]
    fn division_by_zero_leaves_the_stack_untouched() {
        let mut program = Program::new();
        program.push_instruction(Instruction::push(5));
        program.push_instruction(Instruction::push(0));
        program.push_instruction(Instruction::new(Op::Div));
        program.push_instruction(Instruction::new(Op::Exit));
        let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
        interp.run().unwrap();
        assert_eq!(interp.stack().as_slice(), &[5, 0]);
    }
}
