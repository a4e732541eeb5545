//! Bytecode Opcode Definitions
//!
//! Defines the raw opcode set for IMP bytecode.
//! This file contains no execution semantics.
//! Opcode values are a stable contract with the compiler.

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Stack operations
    PushFunc  = 0x01,
    PushProto = 0x02,
    PushInt   = 0x03,
    Peek      = 0x04,
    Poke      = 0x05,
    Pop       = 0x06,

    // Calls
    Call = 0x10,
    Ret  = 0x11,

    // Arithmetic
    Add = 0x20,
    Sub = 0x21,
    Mul = 0x22,
    Div = 0x23,
    Mod = 0x24,

    // Comparison
    Equal = 0x30,

    // Control flow
    JumpFalse = 0x40,
    Jump      = 0x41,

    // System
    Stop = 0xFF,
}

impl Opcode {
    /// Convert raw byte to opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Opcode::PushFunc),
            0x02 => Some(Opcode::PushProto),
            0x03 => Some(Opcode::PushInt),
            0x04 => Some(Opcode::Peek),
            0x05 => Some(Opcode::Poke),
            0x06 => Some(Opcode::Pop),

            0x10 => Some(Opcode::Call),
            0x11 => Some(Opcode::Ret),

            0x20 => Some(Opcode::Add),
            0x21 => Some(Opcode::Sub),
            0x22 => Some(Opcode::Mul),
            0x23 => Some(Opcode::Div),
            0x24 => Some(Opcode::Mod),

            0x30 => Some(Opcode::Equal),

            0x40 => Some(Opcode::JumpFalse),
            0x41 => Some(Opcode::Jump),

            0xFF => Some(Opcode::Stop),

            _ => None,
        }
    }

    /// Total width in bytes of the immediates following the opcode byte
    pub fn operand_len(self) -> usize {
        match self {
            Opcode::PushFunc | Opcode::PushInt | Opcode::Poke => 8,
            Opcode::JumpFalse | Opcode::Jump => 8,
            Opcode::PushProto | Opcode::Peek => 4,
            Opcode::Ret => 8,
            Opcode::Pop
            | Opcode::Call
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Equal
            | Opcode::Stop => 0,
        }
    }

    /// Assembly mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::PushFunc => "PUSH_FUNC",
            Opcode::PushProto => "PUSH_PROTO",
            Opcode::PushInt => "PUSH_INT",
            Opcode::Peek => "PEEK",
            Opcode::Poke => "POKE",
            Opcode::Pop => "POP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Equal => "EQUAL",
            Opcode::JumpFalse => "JUMP_FALSE",
            Opcode::Jump => "JUMP",
            Opcode::Stop => "STOP",
        }
    }
}
