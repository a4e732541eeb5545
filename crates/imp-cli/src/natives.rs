//! Standard natives the CLI host registers, in id order.

use std::io::{self, BufRead, Write};

use imp_core::{Interpreter, NativeRegistry, Value, VmError, VmResult};

pub fn standard() -> NativeRegistry {
    let mut natives = NativeRegistry::new();
    natives.register("print_int", print_int);
    natives.register("read_int", read_int);
    natives.register("assert", assert);
    natives
}

/// Pop an int and print it; yields 0
fn print_int(vm: &mut Interpreter) -> VmResult<()> {
    let v = vm.pop_int()?;
    let mut out = io::stdout().lock();
    writeln!(out, "{}", v)?;
    vm.push(Value::Int(0))
}

/// Read one line from stdin as an int
fn read_int(vm: &mut Interpreter) -> VmResult<()> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let v = line
        .trim()
        .parse::<i64>()
        .map_err(|e| VmError::Native(format!("read_int: {}", e)))?;
    vm.push(Value::Int(v))
}

/// Pop an int and fail on zero; yields 0
fn assert(vm: &mut Interpreter) -> VmResult<()> {
    if vm.pop_int()? == 0 {
        return Err(VmError::Native("assertion failed".into()));
    }
    vm.push(Value::Int(0))
}
