// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Task scheduler: spawn, failure containment, terminal transitions.
//!
//! Each task runs on its own OS thread. The live-task table and the identity
//! registry belong to one `Scheduler`; cloning the scheduler shares them.
//!
//! Every task thread funnels through a single exit point (`TaskExit`), which
//! runs on normal return, executor error, and panic alike. It removes the
//! identity mapping and the live-table entry, then records the outcome and
//! fires the completion broadcast.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::error::TaskError;
use crate::executor::{ExecutorDelegate, TaskContext};
use crate::identity::IdentityRegistry;
use crate::isolate::{isolate, isolate_bindings};
use crate::task::{Task, TaskHandle, TaskId};
use crate::value::Value;

struct Shared {
    config: SchedulerConfig,
    next_id: AtomicI64,
    live: Mutex<HashMap<TaskId, Arc<Task>>>,
    identity: IdentityRegistry,
    executor: OnceLock<Arc<dyn ExecutorDelegate>>,
}

/// Owns the live-task table and identity registry. Cheap to clone.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                next_id: AtomicI64::new(1),
                live: Mutex::new(HashMap::new()),
                identity: IdentityRegistry::new(),
                executor: OnceLock::new(),
            }),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Install the executor. Can only be done once per scheduler.
    pub fn install_executor(&self, executor: Arc<dyn ExecutorDelegate>) -> Result<(), TaskError> {
        self.shared
            .executor
            .set(executor)
            .map_err(|_| TaskError::ExecutorAlreadyInstalled)?;
        info!("task executor installed");
        Ok(())
    }

    pub fn has_executor(&self) -> bool {
        self.shared.executor.get().is_some()
    }

    /// Spawn `callee` on a new thread with `args` as extra arguments.
    ///
    /// Returns as soon as the thread is started. Failures inside the task
    /// (including a missing executor) surface through the handle, not here.
    pub fn spawn(&self, callee: &Value, args: Vec<Value>) -> Result<TaskHandle, TaskError> {
        let closure = callee
            .as_closure()
            .ok_or_else(|| TaskError::InvalidCallable(callee.type_name().to_string()))?;

        let config = &self.shared.config;
        let mut variables = isolate_bindings(&closure.captured, config.isolation);
        for (i, arg) in args.iter().enumerate() {
            // Each name gets its own snapshot, so writes through one don't show through the other.
            if let Some(param) = closure.params.get(i) {
                variables.insert(param.clone(), isolate(arg, config.isolation));
            }
            variables.insert(config.arg_name(i), isolate(arg, config.isolation));
        }

        let id = TaskId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let task = Task::new(id, Arc::clone(closure), variables);

        // Visible before the thread exists, so self-lookup and handle
        // inspection never race the record into existence.
        self.shared.live.lock().insert(id, Arc::clone(&task));
        debug!(task_id = %id, func = %closure.func.name, "spawned task");

        let mut builder = thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, id));
        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }

        let handle = TaskHandle::new(Arc::clone(&task));
        let scheduler = self.clone();
        let running = Arc::clone(&task);
        if let Err(e) = builder.spawn(move || scheduler.run(running)) {
            warn!(task_id = %id, error = %e, "could not start task thread");
            self.retire(&task, Err(TaskError::Spawn(e.to_string())));
        }
        Ok(handle)
    }

    /// Task running on the calling thread.
    pub fn self_id(&self) -> Result<TaskId, TaskError> {
        self.shared.identity.self_id()
    }

    pub fn identity(&self) -> &IdentityRegistry {
        &self.shared.identity
    }

    /// Handle to a task that has not yet terminated.
    pub fn task(&self, id: TaskId) -> Option<TaskHandle> {
        self.shared.live.lock().get(&id).cloned().map(TaskHandle::new)
    }

    pub fn live_tasks(&self) -> Vec<TaskId> {
        let mut ids: Vec<_> = self.shared.live.lock().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn live_count(&self) -> usize {
        self.shared.live.lock().len()
    }

    /// Task thread body.
    fn run(&self, task: Arc<Task>) {
        let key = self.shared.identity.enter(task.id());
        let mut exit = TaskExit {
            scheduler: self,
            task: &task,
            key,
            outcome: None,
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.execute(&task)));
        exit.outcome = Some(match result {
            Ok(outcome) => outcome,
            Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
        });
    }

    fn execute(&self, task: &Task) -> Result<Value, TaskError> {
        let executor = self
            .shared
            .executor
            .get()
            .cloned()
            .ok_or(TaskError::Configuration)?;
        let variables = task.take_variables();
        let ctx = TaskContext::new(task.id(), self.clone());
        executor.execute(&task.body().func, variables, &ctx)
    }

    /// Remove from the live table, then record the outcome and wake waiters.
    fn retire(&self, task: &Task, outcome: Result<Value, TaskError>) {
        self.shared.live.lock().remove(&task.id());
        match &outcome {
            Ok(_) => debug!(task_id = %task.id(), "task completed"),
            Err(TaskError::Panicked(msg)) => warn!(task_id = %task.id(), panic = %msg, "task panicked"),
            Err(e) => debug!(task_id = %task.id(), error = %e, "task failed"),
        }
        if !task.finish(outcome) {
            warn!(task_id = %task.id(), "task already terminal; outcome dropped");
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("live", &self.live_count())
            .field("has_executor", &self.has_executor())
            .finish()
    }
}

/// Cleanup for one task thread. Runs on every exit path via `Drop`.
struct TaskExit<'a> {
    scheduler: &'a Scheduler,
    task: &'a Task,
    key: ThreadId,
    outcome: Option<Result<Value, TaskError>>,
}

impl Drop for TaskExit<'_> {
    fn drop(&mut self) {
        self.scheduler.shared.identity.leave(self.key);
        let outcome = self.outcome.take().unwrap_or_else(|| {
            Err(TaskError::Panicked(
                "task exited without producing an outcome".to_string(),
            ))
        });
        self.scheduler.retire(self.task, outcome);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
