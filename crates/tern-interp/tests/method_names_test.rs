// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Every name listed in method_names must dispatch; nothing else may.

use std::sync::Arc;

use tern_interp::{method_names, NativeExecutor, Runtime, RuntimeError};
use tern_rt::{Closure, FunctionRef, Scheduler, Value};

fn runtime() -> Runtime {
    let scheduler = Scheduler::default();
    let natives = Arc::new(NativeExecutor::new());
    natives.register("unit", |_, _| Ok(Value::Unit));
    scheduler.install_executor(natives).unwrap();
    Runtime::new(scheduler)
}

fn is_dispatch_miss(result: &Result<Value, RuntimeError>) -> bool {
    matches!(
        result,
        Err(RuntimeError::NoSuchMethod { .. }) | Err(RuntimeError::UndefinedFunction(_))
    )
}

#[test]
fn functions_dispatch() {
    let rt = runtime();
    for &name in method_names::FUNCTIONS {
        let args = match name {
            "spawn" => vec![Value::closure(Closure::new(FunctionRef::new("unit")))],
            _ => vec![],
        };
        let result = rt.call_function(name, args);
        assert!(!is_dispatch_miss(&result), "function `{}` is listed but not dispatched", name);
    }
    assert!(is_dispatch_miss(&rt.call_function("sleep", vec![])));
}

#[test]
fn task_methods_dispatch() {
    let rt = runtime();
    let task = rt
        .call_function("spawn", vec![Value::closure(Closure::new(FunctionRef::new("unit")))])
        .unwrap();
    rt.call_method(&task, "wait", vec![]).unwrap();
    for &method in method_names::TASK_METHODS {
        let result = rt.call_method(&task, method, vec![]);
        assert!(!is_dispatch_miss(&result), "Task.{} is listed but not dispatched", method);
    }
    assert!(is_dispatch_miss(&rt.call_method(&task, "cancel", vec![])));
}

#[test]
fn barrier_methods_dispatch() {
    let rt = runtime();
    let barrier = rt.call_function("JoinBarrier", vec![]).unwrap();
    for &method in method_names::BARRIER_METHODS {
        let args = match method {
            "add" => vec![Value::Int(1)],
            _ => vec![],
        };
        let result = rt.call_method(&barrier, method, args);
        assert!(!is_dispatch_miss(&result), "JoinBarrier.{} is listed but not dispatched", method);
    }
    assert!(is_dispatch_miss(&rt.call_method(&barrier, "reset", vec![])));
}

#[test]
fn other_receivers_have_no_task_methods() {
    let rt = runtime();
    assert!(matches!(
        rt.call_method(&Value::Int(1), "wait", vec![]),
        Err(RuntimeError::NoSuchMethod { ty, .. }) if ty == "i64"
    ));
}
