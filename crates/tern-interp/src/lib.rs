// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Script-facing task builtins for the Tern interpreter.
//!
//! Translates script calls (`spawn`, `current_task_id`, `JoinBarrier` and
//! methods on their results) into `tern-rt` operations.

mod builtins;
mod native;
mod runtime;
mod spawn;
pub mod method_names;

pub use native::{NativeExecutor, NativeFn};
pub use runtime::{Runtime, RuntimeError};
