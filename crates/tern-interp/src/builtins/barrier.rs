// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JoinBarrier methods. Misuse (underflow) is a synchronous script error.

use tern_rt::{JoinBarrier, Value};

use crate::runtime::{expect_arity, int_arg, Runtime, RuntimeError};

impl Runtime {
    pub(crate) fn call_barrier_method(
        &self,
        barrier: &JoinBarrier,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match method {
            "add" => {
                expect_arity(&args, 1)?;
                barrier.add(int_arg(&args, 0, "JoinBarrier.add")?)?;
                Ok(Value::Unit)
            }
            "done" => {
                expect_arity(&args, 0)?;
                barrier.done()?;
                Ok(Value::Unit)
            }
            "wait" => {
                expect_arity(&args, 0)?;
                barrier.wait();
                Ok(Value::Unit)
            }
            "count" => {
                expect_arity(&args, 0)?;
                Ok(Value::Int(barrier.count()))
            }
            _ => Err(RuntimeError::NoSuchMethod {
                ty: "JoinBarrier".to_string(),
                method: method.to_string(),
            }),
        }
    }
}
