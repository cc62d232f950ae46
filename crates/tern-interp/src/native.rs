// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Executor for host-registered native functions.
//!
//! The embedding VM registers Rust functions by name and installs the
//! executor on its scheduler. A closure whose `FunctionRef` names a
//! registered function runs that function inside the task.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use tern_rt::{Bindings, ExecutorDelegate, FunctionRef, TaskContext, TaskError, Value};

use crate::runtime::{Runtime, RuntimeError};

pub type NativeFn = Arc<dyn Fn(&Runtime, &Bindings) -> Result<Value, RuntimeError> + Send + Sync>;

#[derive(Default)]
pub struct NativeExecutor {
    functions: RwLock<HashMap<String, NativeFn>>,
}

impl NativeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any earlier registration.
    pub fn register<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&Runtime, &Bindings) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.functions.write().insert(name.into(), Arc::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.read().contains_key(name)
    }
}

impl ExecutorDelegate for NativeExecutor {
    fn execute(
        &self,
        func: &FunctionRef,
        variables: Bindings,
        ctx: &TaskContext,
    ) -> Result<Value, TaskError> {
        // Clone out so the table isn't locked while the body runs.
        let f = self.functions.read().get(&func.name).cloned();
        let f = f.ok_or_else(|| {
            TaskError::Script(RuntimeError::UndefinedFunction(func.name.clone()).to_string())
        })?;
        debug!(task_id = %ctx.task_id(), func = %func.name, "running native function");
        let rt = Runtime::for_task(ctx);
        f(&rt, &variables).map_err(|e| match e {
            RuntimeError::Task(e) => e,
            other => TaskError::Script(other.to_string()),
        })
    }
}

impl std::fmt::Debug for NativeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.functions.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("NativeExecutor").field("functions", &names).finish()
    }
}
