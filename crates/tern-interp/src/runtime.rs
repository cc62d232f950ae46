// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Call-site context for task builtins.

use thiserror::Error;

use tern_rt::{Scheduler, TaskContext, TaskError, Value};

/// Dispatches task builtins for one execution context.
///
/// The top-level interpreter uses `Runtime::new`; code running inside a task
/// gets `Runtime::for_task`, which carries the task's context token.
#[derive(Clone, Debug)]
pub struct Runtime {
    scheduler: Scheduler,
    ctx: Option<TaskContext>,
}

impl Runtime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler, ctx: None }
    }

    pub fn for_task(ctx: &TaskContext) -> Self {
        Self {
            scheduler: ctx.scheduler().clone(),
            ctx: Some(ctx.clone()),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn task_context(&self) -> Option<&TaskContext> {
        self.ctx.as_ref()
    }

    /// Call a task builtin function by name.
    pub fn call_function(&self, name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match name {
            "spawn" => self.spawn_task(args),
            "current_task_id" => self.current_task_id(args),
            "JoinBarrier" => self.new_join_barrier(args),
            _ => Err(RuntimeError::UndefinedFunction(name.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("undefined function `{0}`")]
    UndefinedFunction(String),

    #[error("{0}")]
    TypeError(String),

    #[error("expected {expected} argument{}, got {got}", if *.expected == 1 { "" } else { "s" })]
    ArityMismatch { expected: usize, got: usize },

    #[error("no method `{method}` on type `{ty}`")]
    NoSuchMethod { ty: String, method: String },

    #[error("panic: {0}")]
    Panic(String),

    #[error(transparent)]
    Task(#[from] TaskError),
}

pub(crate) fn expect_arity(args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::ArityMismatch {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

pub(crate) fn int_arg(args: &[Value], index: usize, what: &str) -> Result<i64, RuntimeError> {
    match args.get(index) {
        Some(Value::Int(n)) => Ok(*n),
        Some(other) => Err(RuntimeError::TypeError(format!(
            "{} expects an integer, got {}",
            what,
            other.type_name()
        ))),
        None => Err(RuntimeError::ArityMismatch {
            expected: index + 1,
            got: args.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message() {
        let one = RuntimeError::ArityMismatch { expected: 1, got: 0 };
        let two = RuntimeError::ArityMismatch { expected: 2, got: 3 };
        assert_eq!(one.to_string(), "expected 1 argument, got 0");
        assert_eq!(two.to_string(), "expected 2 arguments, got 3");
    }

    #[test]
    fn task_errors_pass_through() {
        let e: RuntimeError = TaskError::NotInTask.into();
        assert_eq!(e.to_string(), "not running inside a spawned task");
    }

    #[test]
    fn unknown_function() {
        let rt = Runtime::new(Scheduler::default());
        assert!(matches!(
            rt.call_function("sleep", vec![]),
            Err(RuntimeError::UndefinedFunction(name)) if name == "sleep"
        ));
    }

    #[test]
    fn int_arg_checks_type() {
        let args = vec![Value::string("3")];
        assert!(matches!(int_arg(&args, 0, "add"), Err(RuntimeError::TypeError(_))));
        assert_eq!(int_arg(&[Value::Int(3)], 0, "add").unwrap(), 3);
    }
}
