// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The executor boundary.
//!
//! The runtime never interprets function bodies itself. The embedding VM
//! installs an `ExecutorDelegate` on the scheduler once at start-up; every
//! task body is run through it.

use crate::error::TaskError;
use crate::scheduler::Scheduler;
use crate::task::TaskId;
use crate::value::{Bindings, FunctionRef, Value};

/// Runs an interpreted function body.
pub trait ExecutorDelegate: Send + Sync {
    /// Run `func` with `variables` bound. `ctx` identifies the running task.
    fn execute(
        &self,
        func: &FunctionRef,
        variables: Bindings,
        ctx: &TaskContext,
    ) -> Result<Value, TaskError>;
}

impl<F> ExecutorDelegate for F
where
    F: Fn(&FunctionRef, Bindings, &TaskContext) -> Result<Value, TaskError> + Send + Sync,
{
    fn execute(
        &self,
        func: &FunctionRef,
        variables: Bindings,
        ctx: &TaskContext,
    ) -> Result<Value, TaskError> {
        self(func, variables, ctx)
    }
}

/// Identity token handed to the executor for the duration of one task.
///
/// Interpreted code reads its task id from here instead of asking which
/// thread it is on. The scheduler handle lets the body spawn nested tasks.
#[derive(Clone)]
pub struct TaskContext {
    id: TaskId,
    scheduler: Scheduler,
}

impl TaskContext {
    pub(crate) fn new(id: TaskId, scheduler: Scheduler) -> Self {
        Self { id, scheduler }
    }

    pub fn task_id(&self) -> TaskId {
        self.id
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext").field("id", &self.id).finish()
    }
}
