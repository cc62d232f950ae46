// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tern task runtime.
//!
//! Runs interpreted closures on OS threads. The interpreter plugs in through
//! `ExecutorDelegate`; everything else (the live-task table, the identity
//! registry) is owned by a `Scheduler` instance, so independent interpreters
//! can share a process without sharing task state.
//!
//! Components:
//! - value — the value capabilities the runtime relies on
//! - isolate — snapshotting values that cross a task boundary
//! - task — task record, status and completion signal
//! - identity — thread → task mapping for self-lookup
//! - executor — the delegate boundary and per-task context token
//! - scheduler — spawn, failure containment, terminal transitions
//! - barrier — counting join barrier

pub mod barrier;
pub mod config;
pub mod error;
pub mod executor;
pub mod identity;
pub mod isolate;
pub mod scheduler;
pub mod task;
pub mod value;

pub use barrier::JoinBarrier;
pub use config::{IsolationPolicy, SchedulerConfig};
pub use error::TaskError;
pub use executor::{ExecutorDelegate, TaskContext};
pub use identity::IdentityRegistry;
pub use scheduler::Scheduler;
pub use task::{TaskHandle, TaskId, TaskStatus};
pub use value::{Bindings, Closure, FunctionRef, Value, ValueKind};
