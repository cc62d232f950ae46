// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Task module functions: spawn, current_task_id, JoinBarrier.

use std::sync::Arc;

use tern_rt::{JoinBarrier, TaskError, Value};

use crate::runtime::{expect_arity, Runtime, RuntimeError};

impl Runtime {
    /// `spawn(callable, ...args)`
    pub(crate) fn spawn_task(&self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut args = args.into_iter();
        let callee = args
            .next()
            .ok_or_else(|| TaskError::InvalidCallable("nothing".to_string()))?;
        let handle = self.scheduler().spawn(&callee, args.collect())?;
        Ok(Value::Task(handle))
    }

    /// `current_task_id()`
    ///
    /// Answers from the task context when there is one; otherwise asks the
    /// scheduler which task owns the calling thread.
    pub(crate) fn current_task_id(&self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        expect_arity(&args, 0)?;
        let id = match self.task_context() {
            Some(ctx) => ctx.task_id(),
            None => self.scheduler().self_id()?,
        };
        Ok(Value::Int(id.as_i64()))
    }

    /// `JoinBarrier()`
    pub(crate) fn new_join_barrier(&self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        expect_arity(&args, 0)?;
        Ok(Value::Barrier(Arc::new(JoinBarrier::new())))
    }
}
