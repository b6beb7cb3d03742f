//! x86-64 Mach-O-compatible assembly emitter. A pure text
//! function over a `Program`: no optimization passes, one assembly line per
//! instruction plus a fixed preamble/subroutine/data-section boilerplate.
//!
//! The stack head is kept in `%r12` (callee-saved, so the subroutines below
//! can call each other without clobbering it) and points one past the last
//! live dword in `piet_stack`. `Pop`/`Switch`/`Pointer` never call a
//! subroutine: the rotation they'd apply was already resolved statically by
//! the trace builder, so at this layer they just drop a word (`sub $4,
//! %r12`) without reading it.

use std::io::{self, Write};

use canvas_vm::{Instruction, Op, Program};

use crate::error::VmError;

const STACK_CAPACITY: usize = 512;

const PREAMBLE: &str = r#".macro push_imm imm
    movl    $\imm, (%r12)
    addq    $4, %r12
.endm

.macro pop_discard
    subq    $4, %r12
.endm

.macro exit_program
    call    _chout_newline
    movq    $0x2000001, %rax
    xorq    %rdi, %rdi
    syscall
.endm
"#;

const SUBROUTINES: &str = r#".text
// pop() -> %eax: the word at the new stack top.
_pop:
    subq    $4, %r12
    movl    (%r12), %eax
    ret

// pop2() -> %eax = top, %ebx = next. Atomic: both words are read before
// either is considered consumed.
_pop2:
    subq    $4, %r12
    movl    (%r12), %eax
    subq    $4, %r12
    movl    (%r12), %ebx
    ret

// dup(): duplicate the top word in place.
_dup:
    movl    -4(%r12), %eax
    movl    %eax, (%r12)
    addq    $4, %r12
    ret

// add(): push(next + top)
_add:
    call    _pop2
    addl    %eax, %ebx
    movl    %ebx, (%r12)
    addq    $4, %r12
    ret

// sub(): push(next - top)
_sub:
    call    _pop2
    subl    %eax, %ebx
    movl    %ebx, (%r12)
    addq    $4, %r12
    ret

// mult(): push(next * top)
_mult:
    call    _pop2
    imull   %eax, %ebx
    movl    %ebx, (%r12)
    addq    $4, %r12
    ret

// div(): push(next / top), signed; division by zero leaves both operands
// in place rather than faulting.
_div:
    call    _pop2
    cmpl    $0, %eax
    je      2f
    movl    %eax, %ecx
    movl    %ebx, %eax
    cltd
    idivl   %ecx
    movl    %eax, (%r12)
    addq    $4, %r12
    ret
2:
    movl    %ebx, (%r12)
    addq    $4, %r12
    movl    %eax, (%r12)
    addq    $4, %r12
    ret

// mod(): push(next mod top), Euclidean; same zero-divisor guard as div.
_mod:
    call    _pop2
    cmpl    $0, %eax
    je      3f
    movl    %eax, %ecx
    movl    %ebx, %eax
    cltd
    idivl   %ecx
    movl    %edx, (%r12)
    addq    $4, %r12
    ret
3:
    movl    %ebx, (%r12)
    addq    $4, %r12
    movl    %eax, (%r12)
    addq    $4, %r12
    ret

// not(): push(top == 0 ? 1 : 0)
_not:
    call    _pop
    cmpl    $0, %eax
    sete    %al
    movzbl  %al, %eax
    movl    %eax, (%r12)
    addq    $4, %r12
    ret

// greater(): push(next > top ? 1 : 0)
_greater:
    call    _pop2
    cmpl    %eax, %ebx
    setg    %al
    movzbl  %al, %eax
    movl    %eax, (%r12)
    addq    $4, %r12
    ret

// chout(): write the popped value to stdout as a single byte. CharOut
// writes the codepoint's low byte in this minimal ASCII-only back end.
_chout:
    call    _pop
    movl    %eax, chout_byte(%rip)
    movq    $0x2000004, %rax
    movq    $1, %rdi
    leaq    chout_byte(%rip), %rsi
    movq    $1, %rdx
    syscall
    ret

// Writes the single newline byte Exit always terminates output with.
_chout_newline:
    movq    $0x2000004, %rax
    movq    $1, %rdi
    leaq    newline_byte(%rip), %rsi
    movq    $1, %rdx
    syscall
    ret
"#;

fn emit_preamble(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{PREAMBLE}")?;
    writeln!(out, "{SUBROUTINES}")
}

fn emit_instruction(out: &mut dyn Write, instr: &Instruction) -> Result<(), VmError> {
    match instr.op {
        Op::Push => {
            let imm = instr.imm.expect("Push always carries an immediate");
            writeln!(out, "    push_imm {imm}")?;
        }
        Op::Pop | Op::Switch | Op::Pointer => writeln!(out, "    pop_discard")?,
        Op::Add => writeln!(out, "    call    _add")?,
        Op::Sub => writeln!(out, "    call    _sub")?,
        Op::Mult => writeln!(out, "    call    _mult")?,
        Op::Div => writeln!(out, "    call    _div")?,
        Op::Mod => writeln!(out, "    call    _mod")?,
        Op::Not => writeln!(out, "    call    _not")?,
        Op::Greater => writeln!(out, "    call    _greater")?,
        Op::Dup => writeln!(out, "    call    _dup")?,
        Op::CharOut => writeln!(out, "    call    _chout")?,
        Op::Noop => {}
        Op::Exit => writeln!(out, "    exit_program")?,
        Op::NumOut | Op::NumIn | Op::CharIn | Op::Roll => return Err(VmError::UnsupportedOp(instr.op)),
    }
    Ok(())
}

/// Emit the full `.s` text for `program` to `out`. Fails fast on the first
/// instruction with no assembly mapping; nothing is written past that point
/// (the preamble and subroutines, already written, are harmless on their
/// own and the caller is expected to discard the partial output).
pub fn emit(program: &Program, out: &mut dyn Write) -> Result<(), VmError> {
    emit_preamble(out)?;

    writeln!(out, ".globl _main")?;
    writeln!(out, "_main:")?;
    writeln!(out, "    leaq    piet_stack(%rip), %r12")?;
    for instr in &program.instructions {
        emit_instruction(out, instr)?;
    }

    writeln!(out, "\n.data")?;
    writeln!(out, "piet_stack: .zero {}", STACK_CAPACITY * 4)?;
    writeln!(out, "newline_byte: .byte 10")?;
    writeln!(out, "chout_byte: .zero 1")?;
    Ok(())
}
