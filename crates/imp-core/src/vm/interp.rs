//! Interpreter Loop
//!
//! Fetches one opcode at the cursor, runs its handler, repeats until `STOP`.
//!
//! Operands are read straight off the program in the order each handler
//! needs them, and every operand is read even on paths that ignore it: the
//! instruction layout is fixed by the compiler.
//!
//! Calling convention, all on the one stack:
//!
//! ```text
//! caller:  push arg_0 .. arg_{n-1}, push callee, CALL
//! CALL:    pop callee, push return Addr, jump
//! callee:  push `depth` locals, compute result, RET depth n
//! RET:     pop result, drop depth, pop return Addr, drop n, push result
//! ```

use tracing::debug;

use crate::bytecode::{Opcode, Program};
use crate::config::VmConfig;
use crate::error::{VmError, VmResult};
use crate::native::{NativeId, NativeRegistry};

use super::stack::Stack;
use super::value::Value;

/// Outcome of a single instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halt,
}

/// IMP interpreter: program cursor plus operand/frame stack
#[derive(Debug)]
pub struct Interpreter {
    config: VmConfig,
    program: Program,
    natives: NativeRegistry,
    stack: Stack,
    pc: usize,
}

impl Interpreter {
    /// Create an interpreter with an empty stack and the cursor at 0
    pub fn new(config: VmConfig, program: Program, natives: NativeRegistry) -> Self {
        Interpreter {
            stack: Stack::new(config.max_stack_size),
            program,
            natives,
            pc: 0,
            config,
        }
    }

    /// Start execution at `pc` instead of 0
    pub fn with_entry_point(mut self, pc: usize) -> Self {
        self.pc = pc;
        self
    }

    /// Execute until `STOP` or the first error
    pub fn run(&mut self) -> VmResult<()> {
        debug!(pc = self.pc, depth = self.stack.len(), "run started");
        loop {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Halt) => {
                    debug!(pc = self.pc, depth = self.stack.len(), "halted");
                    return Ok(());
                }
                Err(err) => {
                    debug!(pc = self.pc, error = %err, "run aborted");
                    return Err(err);
                }
            }
        }
    }

    /// Execute exactly one instruction
    pub fn step(&mut self) -> VmResult<Step> {
        let op = self.program.read_opcode(&mut self.pc)?;

        match op {
            Opcode::PushFunc => {
                let addr = self.program.read_addr(&mut self.pc)?;
                self.stack.push(Value::Addr(addr))?;
            }
            Opcode::PushProto => {
                let id = self.program.read_u32(&mut self.pc)?;
                self.stack.push(Value::Proto(NativeId(id)))?;
            }
            Opcode::PushInt => {
                let v = self.program.read_i64(&mut self.pc)?;
                self.stack.push(Value::Int(v))?;
            }
            Opcode::Peek => {
                let depth = self.program.read_u32(&mut self.pc)?;
                let slot = self.stack.peek(u64::from(depth))?;
                self.stack.push(Value::Int(slot.raw()))?;
            }
            Opcode::Poke => {
                let depth = self.program.read_u64(&mut self.pc)?;
                let value = self.stack.pop()?;
                self.stack.poke(depth, value)?;
                self.stack.push(value)?;
            }
            Opcode::Pop => {
                self.stack.pop()?;
            }

            Opcode::Call => self.call()?,
            Opcode::Ret => {
                let depth = self.program.read_u32(&mut self.pc)?;
                let nargs = self.program.read_u32(&mut self.pc)?;
                let result = self.stack.pop()?;
                self.stack.shrink(depth as usize)?;
                self.pc = self.stack.pop_addr()?;
                self.stack.shrink(nargs as usize)?;
                self.stack.push(result)?;
            }

            Opcode::Add => self.binary_op(checked_add)?,
            Opcode::Sub => self.binary_op(checked_sub)?,
            Opcode::Mul => self.binary_op(checked_mul)?,
            Opcode::Div => self.binary_op(checked_div)?,
            Opcode::Mod => self.binary_op(checked_rem)?,
            Opcode::Equal => self.binary_op(|lhs, rhs| Ok(i64::from(lhs == rhs)))?,

            Opcode::JumpFalse => {
                let cond = self.stack.pop()?;
                let target = self.program.read_addr(&mut self.pc)?;
                if !cond.is_truthy() {
                    self.pc = target;
                }
            }
            Opcode::Jump => {
                self.pc = self.program.read_addr(&mut self.pc)?;
            }

            Opcode::Stop => return Ok(Step::Halt),
        }

        Ok(Step::Continue)
    }

    fn call(&mut self) -> VmResult<()> {
        match self.stack.pop()? {
            Value::Proto(id) => {
                let native = self.natives.get(id)?;
                native(self)
            }
            Value::Addr(addr) => {
                self.stack.push(Value::Addr(self.pc))?;
                self.pc = addr;
                Ok(())
            }
            Value::Int(_) => Err(VmError::NotCallable),
        }
    }

    /// Pop `rhs` (pushed last) then `lhs`, push `f(lhs, rhs)`
    fn binary_op(&mut self, f: impl FnOnce(i64, i64) -> VmResult<i64>) -> VmResult<()> {
        let rhs = self.stack.pop_int()?;
        let lhs = self.stack.pop_int()?;
        self.stack.push(Value::Int(f(lhs, rhs)?))
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    pub fn push(&mut self, value: Value) -> VmResult<()> {
        self.stack.push(value)
    }

    pub fn pop(&mut self) -> VmResult<Value> {
        self.stack.pop()
    }

    pub fn pop_int(&mut self) -> VmResult<i64> {
        self.stack.pop_int()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }
}

fn checked_add(lhs: i64, rhs: i64) -> VmResult<i64> {
    lhs.checked_add(rhs).ok_or(if rhs > 0 {
        VmError::IntegerOverflow
    } else {
        VmError::IntegerUnderflow
    })
}

fn checked_sub(lhs: i64, rhs: i64) -> VmResult<i64> {
    lhs.checked_sub(rhs).ok_or(if rhs < 0 {
        VmError::IntegerOverflow
    } else {
        VmError::IntegerUnderflow
    })
}

// Widen, multiply, and narrow back; the sign of the wide product says which
// bound was crossed.
fn checked_mul(lhs: i64, rhs: i64) -> VmResult<i64> {
    let wide = i128::from(lhs) * i128::from(rhs);
    i64::try_from(wide).map_err(|_| {
        if wide > 0 {
            VmError::IntegerOverflow
        } else {
            VmError::IntegerUnderflow
        }
    })
}

fn checked_div(lhs: i64, rhs: i64) -> VmResult<i64> {
    if rhs == 0 {
        return Err(VmError::DivisionByZero);
    }
    // only i64::MIN / -1 is left
    lhs.checked_div(rhs).ok_or(VmError::IntegerOverflow)
}

fn checked_rem(lhs: i64, rhs: i64) -> VmResult<i64> {
    if rhs == 0 {
        return Err(VmError::DivisionByZero);
    }
    lhs.checked_rem(rhs).ok_or(VmError::IntegerOverflow)
}
