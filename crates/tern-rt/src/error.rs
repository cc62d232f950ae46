// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Task runtime errors.

use thiserror::Error;

/// Errors produced by the task runtime.
///
/// Cloneable: a task's terminal error is observed by every handle and waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// No executor delegate was installed before the task ran.
    #[error("no executor installed; the embedding VM must install one before tasks can run")]
    Configuration,

    #[error("an executor is already installed for this scheduler")]
    ExecutorAlreadyInstalled,

    /// Spawn target is absent or cannot be called.
    #[error("spawn expects a callable, got {0}")]
    InvalidCallable(String),

    /// A fault inside the task body was recovered at the task boundary.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// Self-identity was requested outside any spawned task.
    #[error("not running inside a spawned task")]
    NotInTask,

    #[error("join barrier counter cannot go negative ({count} + {delta})")]
    NegativeCounter { count: i64, delta: i64 },

    /// Error reported by the executor while running the body.
    #[error("{0}")]
    Script(String),

    /// The host could not create an execution unit for the task.
    #[error("failed to start task thread: {0}")]
    Spawn(String),
}

impl TaskError {
    /// Script-facing error kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Configuration | TaskError::ExecutorAlreadyInstalled => "ConfigurationError",
            TaskError::InvalidCallable(_) => "InvalidCallableError",
            TaskError::Panicked(_) => "TaskPanicError",
            TaskError::NotInTask => "NotInTaskError",
            TaskError::NegativeCounter { .. } => "NegativeCounterError",
            TaskError::Script(_) => "ScriptError",
            TaskError::Spawn(_) => "SpawnError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            TaskError::NegativeCounter { count: 1, delta: -2 }.to_string(),
            "join barrier counter cannot go negative (1 + -2)"
        );
        assert_eq!(TaskError::Panicked("boom".into()).to_string(), "task panicked: boom");
        assert_eq!(TaskError::Script("bad".into()).to_string(), "bad");
    }

    #[test]
    fn kinds() {
        assert_eq!(TaskError::Configuration.kind(), "ConfigurationError");
        assert_eq!(TaskError::NotInTask.kind(), "NotInTaskError");
        assert_eq!(TaskError::InvalidCallable("Int".into()).kind(), "InvalidCallableError");
    }
}
