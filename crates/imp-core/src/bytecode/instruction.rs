//! Bytecode Instruction Representation
//!
//! Typed view of one encoded instruction, for building code and for
//! disassembly. The interpreter does not go through this type; it reads
//! operands straight off the program as each handler needs them.

use std::fmt;

use crate::error::VmResult;
use crate::native::NativeId;
use super::opcode::Opcode;
use super::program::Program;

/// One instruction with its immediates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    PushFunc(u64),
    PushProto(NativeId),
    PushInt(i64),
    Peek(u32),
    Poke(u64),
    Pop,
    Call,
    Ret { depth: u32, nargs: u32 },
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    JumpFalse(u64),
    Jump(u64),
    Stop,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::PushFunc(_) => Opcode::PushFunc,
            Instruction::PushProto(_) => Opcode::PushProto,
            Instruction::PushInt(_) => Opcode::PushInt,
            Instruction::Peek(_) => Opcode::Peek,
            Instruction::Poke(_) => Opcode::Poke,
            Instruction::Pop => Opcode::Pop,
            Instruction::Call => Opcode::Call,
            Instruction::Ret { .. } => Opcode::Ret,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Mod => Opcode::Mod,
            Instruction::Equal => Opcode::Equal,
            Instruction::JumpFalse(_) => Opcode::JumpFalse,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::Stop => Opcode::Stop,
        }
    }

    /// Size in bytes once encoded, opcode included
    pub fn encoded_len(&self) -> usize {
        1 + self.opcode().operand_len()
    }

    /// Append the encoded instruction to `out`
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode() as u8);
        match *self {
            Instruction::PushFunc(addr)
            | Instruction::JumpFalse(addr)
            | Instruction::Jump(addr) => out.extend_from_slice(&addr.to_le_bytes()),
            Instruction::PushProto(id) => out.extend_from_slice(&id.0.to_le_bytes()),
            Instruction::PushInt(v) => out.extend_from_slice(&v.to_le_bytes()),
            Instruction::Peek(depth) => out.extend_from_slice(&depth.to_le_bytes()),
            Instruction::Poke(depth) => out.extend_from_slice(&depth.to_le_bytes()),
            Instruction::Ret { depth, nargs } => {
                out.extend_from_slice(&depth.to_le_bytes());
                out.extend_from_slice(&nargs.to_le_bytes());
            }
            Instruction::Pop
            | Instruction::Call
            | Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Mod
            | Instruction::Equal
            | Instruction::Stop => {}
        }
    }

    /// Decode the instruction at `pc`, advancing past it
    pub fn decode(program: &Program, pc: &mut usize) -> VmResult<Self> {
        let ins = match program.read_opcode(pc)? {
            Opcode::PushFunc => Instruction::PushFunc(program.read_u64(pc)?),
            Opcode::PushProto => Instruction::PushProto(NativeId(program.read_u32(pc)?)),
            Opcode::PushInt => Instruction::PushInt(program.read_i64(pc)?),
            Opcode::Peek => Instruction::Peek(program.read_u32(pc)?),
            Opcode::Poke => Instruction::Poke(program.read_u64(pc)?),
            Opcode::Pop => Instruction::Pop,
            Opcode::Call => Instruction::Call,
            Opcode::Ret => {
                let depth = program.read_u32(pc)?;
                let nargs = program.read_u32(pc)?;
                Instruction::Ret { depth, nargs }
            }
            Opcode::Add => Instruction::Add,
            Opcode::Sub => Instruction::Sub,
            Opcode::Mul => Instruction::Mul,
            Opcode::Div => Instruction::Div,
            Opcode::Mod => Instruction::Mod,
            Opcode::Equal => Instruction::Equal,
            Opcode::JumpFalse => Instruction::JumpFalse(program.read_u64(pc)?),
            Opcode::Jump => Instruction::Jump(program.read_u64(pc)?),
            Opcode::Stop => Instruction::Stop,
        };
        Ok(ins)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode().mnemonic();
        match *self {
            Instruction::PushFunc(addr)
            | Instruction::JumpFalse(addr)
            | Instruction::Jump(addr) => write!(f, "{} {:#06x}", name, addr),
            Instruction::PushProto(id) => write!(f, "{} #{}", name, id.0),
            Instruction::PushInt(v) => write!(f, "{} {}", name, v),
            Instruction::Peek(depth) => write!(f, "{} {}", name, depth),
            Instruction::Poke(depth) => write!(f, "{} {}", name, depth),
            Instruction::Ret { depth, nargs } => write!(f, "{} {} {}", name, depth, nargs),
            _ => f.write_str(name),
        }
    }
}

/// Encode a sequence of instructions back to back
pub fn assemble(code: &[Instruction]) -> Vec<u8> {
    let mut out = Vec::with_capacity(code.iter().map(Instruction::encoded_len).sum());
    for ins in code {
        ins.encode(&mut out);
    }
    out
}

/// Decode a whole program into `(offset, instruction)` pairs
pub fn disassemble(program: &Program) -> VmResult<Vec<(usize, Instruction)>> {
    let mut pc = 0;
    let mut out = Vec::new();
    while pc < program.len() {
        let offset = pc;
        out.push((offset, Instruction::decode(program, &mut pc)?));
    }
    Ok(out)
}
