//! Instruction semantics and the calling convention, exercised end to end.

mod common;

use common::{interp, interp_with, ints, offset_of, run};
use imp_core::Instruction::*;
use imp_core::{Interpreter, NativeId, NativeRegistry, Step, Value, ValueKind, VmError, VmResult};

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn push_push_add_stop_leaves_five() {
    assert_eq!(run(&[PushInt(2), PushInt(3), Add, Stop]), Ok(ints(&[5])));
}

#[test]
fn binary_operators_use_push_order() {
    assert_eq!(run(&[PushInt(10), PushInt(3), Sub, Stop]), Ok(ints(&[7])));
    assert_eq!(run(&[PushInt(7), PushInt(2), Div, Stop]), Ok(ints(&[3])));
    assert_eq!(run(&[PushInt(7), PushInt(2), Mod, Stop]), Ok(ints(&[1])));
    assert_eq!(run(&[PushInt(-7), PushInt(2), Div, Stop]), Ok(ints(&[-3])));
    assert_eq!(run(&[PushInt(-6), PushInt(4), Mul, Stop]), Ok(ints(&[-24])));
}

#[test]
fn overflow_signalled_at_the_boundary() {
    assert_eq!(
        run(&[PushInt(i64::MAX), PushInt(1), Add, Stop]),
        Err(VmError::IntegerOverflow)
    );
    assert_eq!(
        run(&[PushInt(i64::MIN), PushInt(1), Sub, Stop]),
        Err(VmError::IntegerUnderflow)
    );
    assert_eq!(
        run(&[PushInt(i64::MIN), PushInt(-1), Add, Stop]),
        Err(VmError::IntegerUnderflow)
    );
    assert_eq!(
        run(&[PushInt(i64::MAX), PushInt(-1), Sub, Stop]),
        Err(VmError::IntegerOverflow)
    );
    assert_eq!(
        run(&[PushInt(i64::MAX / 2 + 1), PushInt(2), Mul, Stop]),
        Err(VmError::IntegerOverflow)
    );
    assert_eq!(
        run(&[PushInt(i64::MAX - 1), PushInt(1), Add, Stop]),
        Ok(ints(&[i64::MAX]))
    );
}

#[test]
fn division_by_zero_traps() {
    assert_eq!(run(&[PushInt(1), PushInt(0), Div, Stop]), Err(VmError::DivisionByZero));
    assert_eq!(run(&[PushInt(1), PushInt(0), Mod, Stop]), Err(VmError::DivisionByZero));
    assert_eq!(
        run(&[PushInt(i64::MIN), PushInt(-1), Div, Stop]),
        Err(VmError::IntegerOverflow)
    );
}

#[test]
fn arithmetic_rejects_non_integers() {
    assert_eq!(
        run(&[PushFunc(0), PushInt(1), Add, Stop]),
        Err(VmError::TypeMismatch { expected: ValueKind::Int, found: ValueKind::Addr })
    );
    assert_eq!(
        run(&[PushInt(1), PushProto(NativeId(0)), Equal, Stop]),
        Err(VmError::TypeMismatch { expected: ValueKind::Int, found: ValueKind::Proto })
    );
}

#[test]
fn equal_pushes_one_or_zero() {
    assert_eq!(run(&[PushInt(4), PushInt(4), Equal, Stop]), Ok(ints(&[1])));
    assert_eq!(run(&[PushInt(4), PushInt(5), Equal, Stop]), Ok(ints(&[0])));
}

// =============================================================================
// Stack access
// =============================================================================

#[test]
fn peek_copies_without_removing() {
    assert_eq!(
        run(&[PushInt(1), PushInt(2), Peek(0), Peek(2), Stop]),
        Ok(ints(&[1, 2, 2, 1]))
    );
}

#[test]
fn peek_retags_as_int() {
    let stack = run(&[PushFunc(0x30), PushProto(NativeId(4)), Peek(1), Peek(1), Stop]).unwrap();
    assert_eq!(
        stack,
        vec![
            Value::Addr(0x30),
            Value::Proto(NativeId(4)),
            Value::Int(0x30),
            Value::Int(4),
        ]
    );
}

#[test]
fn peek_out_of_range_fails() {
    assert_eq!(
        run(&[PushInt(1), Peek(1), Stop]),
        Err(VmError::InvalidStackAccess { depth: 1, len: 1 })
    );
}

#[test]
fn poke_updates_slot_and_leaves_value_on_top() {
    assert_eq!(
        run(&[PushInt(1), PushInt(2), PushInt(3), PushInt(9), Poke(1), Stop]),
        Ok(ints(&[1, 9, 3, 9]))
    );
}

#[test]
fn pop_discards_top() {
    assert_eq!(run(&[PushInt(1), PushInt(2), Pop, Stop]), Ok(ints(&[1])));
    assert_eq!(run(&[Pop, Stop]), Err(VmError::StackUnderflow));
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn jump_false_consumes_operand_when_not_taken() {
    let mut vm = interp(&[PushInt(1), JumpFalse(0xdead), PushInt(42), Stop]);
    assert_eq!(vm.step(), Ok(Step::Continue));
    assert_eq!(vm.step(), Ok(Step::Continue));
    assert_eq!(vm.pc(), 18);
    assert!(vm.stack().is_empty());

    vm.run().unwrap();
    assert_eq!(vm.stack().as_slice(), &ints(&[42])[..]);
}

#[test]
fn jump_false_taken_on_zero() {
    let template = [PushInt(0), JumpFalse(0), PushInt(1), Stop, PushInt(2), Stop];
    let target = offset_of(&template, 4);
    let code = [PushInt(0), JumpFalse(target), PushInt(1), Stop, PushInt(2), Stop];
    assert_eq!(run(&code), Ok(ints(&[2])));
}

#[test]
fn equal_result_drives_branch() {
    // if 3 == 3 { 10 } else { 20 }
    let build = |else_at: u64, end_at: u64| {
        vec![
            PushInt(3),
            PushInt(3),
            Equal,
            JumpFalse(else_at),
            PushInt(10),
            Jump(end_at),
            PushInt(20),
            Stop,
        ]
    };
    let template = build(0, 0);
    let code = build(offset_of(&template, 6), offset_of(&template, 7));
    assert_eq!(run(&code), Ok(ints(&[10])));
}

#[test]
fn loop_sums_countdown() {
    // acc = 0; i = 10; while i { acc += i; i -= 1 }
    let build = |loop_at: u64, end_at: u64| {
        vec![
            PushInt(0),
            PushInt(10),
            Peek(0),
            JumpFalse(end_at),
            Peek(1),
            Peek(1),
            Add,
            Poke(1),
            Pop,
            Peek(0),
            PushInt(1),
            Sub,
            Poke(0),
            Pop,
            Jump(loop_at),
            Pop,
            Stop,
        ]
    };
    let template = build(0, 0);
    let code = build(offset_of(&template, 2), offset_of(&template, 15));
    assert_eq!(run(&code), Ok(ints(&[55])));
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn call_on_int_is_not_callable() {
    assert_eq!(run(&[PushInt(0), Call, Stop]), Err(VmError::NotCallable));
    assert_eq!(
        run(&[PushInt(1), PushInt(2), PushInt(3), PushInt(7), Call, Stop]),
        Err(VmError::NotCallable)
    );
}

#[test]
fn call_then_ret_resumes_after_call() {
    // 0: PUSH_FUNC f  9: CALL  10: STOP  11: f: PUSH_INT 7  20: RET 0 0
    let mut vm = interp(&[PushFunc(11), Call, Stop, PushInt(7), Ret { depth: 0, nargs: 0 }]);

    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.pc(), 11);
    assert_eq!(vm.stack().as_slice(), &[Value::Addr(10)]);

    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.pc(), 10);
    assert_eq!(vm.stack().as_slice(), &ints(&[7])[..]);

    assert_eq!(vm.step(), Ok(Step::Halt));
}

#[test]
fn ret_discards_arguments() {
    // f(a, b) = a - b, called as f(40, 2)
    let template = [PushInt(40), PushInt(2), PushFunc(0), Call, Stop];
    let f = offset_of(&template, template.len());
    let code = [
        PushInt(40),
        PushInt(2),
        PushFunc(f),
        Call,
        Stop,
        Peek(2),
        Peek(2),
        Sub,
        Ret { depth: 0, nargs: 2 },
    ];
    assert_eq!(run(&code), Ok(ints(&[38])));
}

#[test]
fn ret_discards_locals_then_arguments() {
    // f(x) { let local = 100; x + local }
    let template = [PushInt(-1), PushInt(5), PushFunc(0), Call, Stop];
    let f = offset_of(&template, template.len());
    let code = [
        PushInt(-1),
        PushInt(5),
        PushFunc(f),
        Call,
        Stop,
        PushInt(100),
        Peek(2),
        Peek(1),
        Add,
        Ret { depth: 1, nargs: 1 },
    ];
    assert_eq!(run(&code), Ok(ints(&[-1, 105])));
}

#[test]
fn ret_requires_return_address() {
    assert_eq!(
        run(&[PushInt(1), PushInt(2), Ret { depth: 0, nargs: 0 }]),
        Err(VmError::TypeMismatch { expected: ValueKind::Addr, found: ValueKind::Int })
    );
}

#[test]
fn recursive_factorial() {
    let build = |fact: u64, recur: u64| {
        vec![
            PushInt(5),
            PushFunc(fact),
            Call,
            Stop,
            // fact(n): [n, ret]
            Peek(1),
            PushInt(0),
            Equal,
            JumpFalse(recur),
            PushInt(1),
            Ret { depth: 0, nargs: 1 },
            // recur: n * fact(n - 1)
            Peek(1),
            Peek(2),
            PushInt(1),
            Sub,
            PushFunc(fact),
            Call,
            Mul,
            Ret { depth: 0, nargs: 1 },
        ]
    };
    let template = build(0, 0);
    let code = build(offset_of(&template, 4), offset_of(&template, 10));
    assert_eq!(run(&code), Ok(ints(&[120])));
}

// =============================================================================
// Natives
// =============================================================================

fn double(vm: &mut Interpreter) -> VmResult<()> {
    let v = vm.pop_int()?;
    vm.push(Value::Int(v * 2))
}

fn fail(_: &mut Interpreter) -> VmResult<()> {
    Err(VmError::Native("refused".into()))
}

fn skip_next(vm: &mut Interpreter) -> VmResult<()> {
    // jump over the following one-byte instruction
    let pc = vm.pc();
    vm.set_pc(pc + 1);
    vm.push(Value::Int(0))
}

#[test]
fn native_receives_interpreter() {
    let mut natives = NativeRegistry::new();
    let id = natives.register("double", double);
    let mut vm = interp_with(&[PushInt(21), PushProto(id), Call, Stop], natives);
    vm.run().unwrap();
    assert_eq!(vm.stack().as_slice(), &ints(&[42])[..]);
}

#[test]
fn native_may_move_cursor() {
    let mut natives = NativeRegistry::new();
    let id = natives.register("skip_next", skip_next);
    let mut vm = interp_with(&[PushProto(id), Call, Pop, Stop], natives);
    vm.run().unwrap();
    assert_eq!(vm.stack().as_slice(), &ints(&[0])[..]);
}

#[test]
fn native_errors_abort_run() {
    let mut natives = NativeRegistry::new();
    let id = natives.register("fail", fail);
    let mut vm = interp_with(&[PushProto(id), Call, Stop], natives);
    assert_eq!(vm.run(), Err(VmError::Native("refused".into())));
}

#[test]
fn unregistered_native_is_unknown() {
    assert_eq!(
        run(&[PushProto(NativeId(9)), Call, Stop]),
        Err(VmError::UnknownNative(9))
    );
}
