#![allow(dead_code)]

use imp_core::{assemble, Instruction, Interpreter, NativeRegistry, Program, Value, VmConfig, VmResult};

pub fn interp(code: &[Instruction]) -> Interpreter {
    interp_with(code, NativeRegistry::new())
}

pub fn interp_with(code: &[Instruction], natives: NativeRegistry) -> Interpreter {
    Interpreter::new(VmConfig::new(), Program::new(assemble(code)), natives)
}

/// Run `code` to completion and return the final stack
pub fn run(code: &[Instruction]) -> VmResult<Vec<Value>> {
    let mut vm = interp(code);
    vm.run()?;
    Ok(vm.stack().as_slice().to_vec())
}

/// Byte offset of `code[index]` once assembled
pub fn offset_of(code: &[Instruction], index: usize) -> u64 {
    code[..index].iter().map(Instruction::encoded_len).sum::<usize>() as u64
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}
