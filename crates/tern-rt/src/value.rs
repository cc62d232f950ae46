// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Runtime values, as seen by the task runtime.
//!
//! The interpreter owns the meaning of these values. The runtime only asks
//! the questions below: what kind is it, can it be called, and how is it copied.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::barrier::JoinBarrier;
use crate::task::TaskHandle;

/// Name → value bindings, in definition order.
pub type Bindings = IndexMap<String, Value>;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    /// Strings are mutable buffers; cloning the value aliases the buffer.
    String(Arc<Mutex<String>>),
    Vec(Arc<Mutex<Vec<Value>>>),
    Map(Arc<Mutex<IndexMap<String, Value>>>),
    Struct {
        name: String,
        fields: Arc<Mutex<IndexMap<String, Value>>>,
    },
    Enum {
        name: String,
        variant: String,
        fields: Vec<Value>,
    },
    Closure(Arc<Closure>),
    Task(TaskHandle),
    Barrier(Arc<JoinBarrier>),
}

/// Coarse value classification used by isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Self-contained data: copying yields an independent value.
    Scalar,
    /// Containers holding other values behind shared storage.
    Composite,
    Callable,
    /// Runtime synchronisation objects; always shared, never copied.
    Resource,
}

/// Reference to a function body the executor knows how to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    pub name: String,
}

impl FunctionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A function body plus the bindings it closed over.
#[derive(Debug, Clone)]
pub struct Closure {
    pub func: FunctionRef,
    pub params: Vec<String>,
    pub captured: Bindings,
}

impl Closure {
    pub fn new(func: FunctionRef) -> Self {
        Self {
            func,
            params: vec![],
            captured: Bindings::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub fn capture(mut self, name: impl Into<String>, value: Value) -> Self {
        self.captured.insert(name.into(), value);
        self
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Arc::new(Mutex::new(s.into())))
    }

    pub fn vec(items: Vec<Value>) -> Value {
        Value::Vec(Arc::new(Mutex::new(items)))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Value {
        Value::Map(Arc::new(Mutex::new(entries)))
    }

    pub fn closure(closure: Closure) -> Value {
        Value::Closure(Arc::new(closure))
    }

    /// `Result.Ok(value)`
    pub fn ok(value: Value) -> Value {
        Value::Enum {
            name: "Result".to_string(),
            variant: "Ok".to_string(),
            fields: vec![value],
        }
    }

    /// `Result.Err(value)`
    pub fn err(value: Value) -> Value {
        Value::Enum {
            name: "Result".to_string(),
            variant: "Err".to_string(),
            fields: vec![value],
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Char(_)
            | Value::String(_) => ValueKind::Scalar,
            Value::Vec(_) | Value::Map(_) | Value::Struct { .. } | Value::Enum { .. } => {
                ValueKind::Composite
            }
            Value::Closure(_) => ValueKind::Callable,
            Value::Task(_) | Value::Barrier(_) => ValueKind::Resource,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.kind() == ValueKind::Callable
    }

    pub fn as_closure(&self) -> Option<&Arc<Closure>> {
        match self {
            Value::Closure(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Snapshot of a string value's contents.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.lock().clone()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "()",
            Value::Bool(_) => "bool",
            Value::Int(_) => "i64",
            Value::Float(_) => "f64",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Vec(_) => "Vec",
            Value::Map(_) => "Map",
            Value::Struct { .. } => "struct",
            Value::Enum { .. } => "enum",
            Value::Closure(_) => "closure",
            Value::Task(_) => "Task",
            Value::Barrier(_) => "JoinBarrier",
        }
    }

    /// Copy into fresh storage all the way down.
    ///
    /// Resources stay shared: a copied barrier would synchronise nothing.
    /// A container reached twice (including through itself) is copied once,
    /// so cycles and sharing survive in the copy.
    pub fn deep_copy(&self) -> Value {
        self.copy_with(&mut HashMap::new())
    }

    fn copy_with(&self, copies: &mut Copies) -> Value {
        match self {
            Value::Unit => Value::Unit,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(n) => Value::Int(*n),
            Value::Float(f) => Value::Float(*f),
            Value::Char(c) => Value::Char(*c),
            Value::String(s) => Value::string(s.lock().clone()),
            Value::Vec(items) => {
                let key = addr(items);
                if let Some(done) = copies.get(&key) {
                    return done.clone();
                }
                let fresh = Arc::new(Mutex::new(Vec::new()));
                copies.insert(key, Value::Vec(fresh.clone()));
                let copied: Vec<Value> = items.lock().iter().map(|v| v.copy_with(copies)).collect();
                *fresh.lock() = copied;
                Value::Vec(fresh)
            }
            Value::Map(entries) => {
                let key = addr(entries);
                if let Some(done) = copies.get(&key) {
                    return done.clone();
                }
                let fresh = Arc::new(Mutex::new(IndexMap::new()));
                copies.insert(key, Value::Map(fresh.clone()));
                let copied = copy_entries(&entries.lock(), copies);
                *fresh.lock() = copied;
                Value::Map(fresh)
            }
            Value::Struct { name, fields } => {
                let key = addr(fields);
                if let Some(done) = copies.get(&key) {
                    return done.clone();
                }
                let fresh = Arc::new(Mutex::new(IndexMap::new()));
                copies.insert(
                    key,
                    Value::Struct {
                        name: name.clone(),
                        fields: fresh.clone(),
                    },
                );
                let copied = copy_entries(&fields.lock(), copies);
                *fresh.lock() = copied;
                Value::Struct {
                    name: name.clone(),
                    fields: fresh,
                }
            }
            Value::Enum { name, variant, fields } => Value::Enum {
                name: name.clone(),
                variant: variant.clone(),
                fields: fields.iter().map(|v| v.copy_with(copies)).collect(),
            },
            Value::Closure(c) => Value::closure(Closure {
                func: c.func.clone(),
                params: c.params.clone(),
                captured: copy_entries(&c.captured, copies),
            }),
            Value::Task(_) | Value::Barrier(_) => self.clone(),
        }
    }

    fn write_to(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<usize>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => write!(f, "{}", s.lock()),
            Value::Vec(items) => {
                let key = addr(items);
                if open.contains(&key) {
                    return write!(f, "[...]");
                }
                open.push(key);
                write!(f, "[")?;
                for (i, item) in items.lock().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.write_to(f, open)?;
                }
                open.pop();
                write!(f, "]")
            }
            Value::Map(entries) => {
                let key = addr(entries);
                if open.contains(&key) {
                    return write!(f, "{{...}}");
                }
                open.push(key);
                write!(f, "{{")?;
                write_entries(f, &entries.lock(), open)?;
                open.pop();
                write!(f, "}}")
            }
            Value::Struct { name, fields } => {
                let key = addr(fields);
                if open.contains(&key) {
                    return write!(f, "{} {{ ... }}", name);
                }
                open.push(key);
                write!(f, "{} {{ ", name)?;
                write_entries(f, &fields.lock(), open)?;
                open.pop();
                write!(f, " }}")
            }
            Value::Enum { name, variant, fields } => {
                write!(f, "{}.{}", name, variant)?;
                if !fields.is_empty() {
                    write!(f, "(")?;
                    for (i, field) in fields.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        field.write_to(f, open)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Value::Closure(c) => write!(f, "<closure {}>", c.func.name),
            Value::Task(h) => write!(f, "<task {}>", h.id()),
            Value::Barrier(b) => write!(f, "<JoinBarrier count={}>", b.count()),
        }
    }
}

/// Copies made so far, keyed by source container address.
type Copies = HashMap<usize, Value>;

fn addr<T>(storage: &Arc<Mutex<T>>) -> usize {
    Arc::as_ptr(storage) as usize
}

fn copy_entries(entries: &IndexMap<String, Value>, copies: &mut Copies) -> IndexMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), v.copy_with(copies)))
        .collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Containers being printed; re-entering one means a cycle.
        self.write_to(f, &mut Vec::new())
    }
}

fn write_entries(
    f: &mut fmt::Formatter<'_>,
    entries: &IndexMap<String, Value>,
    open: &mut Vec<usize>,
) -> fmt::Result {
    for (i, (k, v)) in entries.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: ", k)?;
        v.write_to(f, open)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Value::Int(1).kind(), ValueKind::Scalar);
        assert_eq!(Value::string("x").kind(), ValueKind::Scalar);
        assert_eq!(Value::vec(vec![]).kind(), ValueKind::Composite);
        assert_eq!(Value::ok(Value::Unit).kind(), ValueKind::Composite);
        assert_eq!(Value::Barrier(Arc::new(JoinBarrier::new())).kind(), ValueKind::Resource);
        assert!(Value::closure(Closure::new(FunctionRef::new("f"))).is_callable());
        assert!(!Value::Int(3).is_callable());
    }

    #[test]
    fn clone_aliases_deep_copy_does_not() {
        let v = Value::vec(vec![Value::Int(1)]);
        let alias = v.clone();
        let copy = v.deep_copy();
        if let Value::Vec(items) = &v {
            items.lock().push(Value::Int(2));
        }
        assert_eq!(alias.to_string(), "[1, 2]");
        assert_eq!(copy.to_string(), "[1]");
    }

    #[test]
    fn deep_copy_keeps_barrier_shared() {
        let b = Arc::new(JoinBarrier::new());
        let copy = Value::Barrier(b.clone()).deep_copy();
        b.add(2).unwrap();
        match copy {
            Value::Barrier(c) => assert_eq!(c.count(), 2),
            other => panic!("expected barrier, got {:?}", other),
        }
    }

    #[test]
    fn deep_copy_of_cyclic_vec_keeps_the_cycle() {
        let v = Value::vec(vec![Value::Int(1)]);
        let Value::Vec(items) = &v else { unreachable!() };
        items.lock().push(v.clone());

        let copy = v.deep_copy();
        let Value::Vec(copied) = &copy else { panic!("expected Vec") };
        assert!(!Arc::ptr_eq(items, copied));
        match &copied.lock()[1] {
            Value::Vec(inner) => assert!(Arc::ptr_eq(inner, copied)),
            other => panic!("expected Vec, got {:?}", other),
        }
        // Break the cycles so the buffers are freed.
        items.lock().clear();
        copied.lock().clear();
    }

    #[test]
    fn deep_copy_preserves_sharing() {
        let shared = Value::vec(vec![]);
        let outer = Value::vec(vec![shared.clone(), shared]);
        let Value::Vec(copied) = outer.deep_copy() else { panic!("expected Vec") };
        let copied = copied.lock();
        match (&copied[0], &copied[1]) {
            (Value::Vec(a), Value::Vec(b)) => assert!(Arc::ptr_eq(a, b)),
            other => panic!("expected two Vecs, got {:?}", other),
        }
    }

    #[test]
    fn display_cuts_cycles() {
        let v = Value::vec(vec![Value::Int(1)]);
        let Value::Vec(items) = &v else { unreachable!() };
        items.lock().push(v.clone());
        assert_eq!(v.to_string(), "[1, [...]]");

        let m = Value::map(IndexMap::new());
        let Value::Map(entries) = &m else { unreachable!() };
        entries.lock().insert("me".to_string(), m.clone());
        assert_eq!(m.to_string(), "{me: {...}}");

        items.lock().clear();
        entries.lock().clear();
    }

    #[test]
    fn display() {
        let mut m = IndexMap::new();
        m.insert("a".to_string(), Value::Int(1));
        m.insert("b".to_string(), Value::string("hi"));
        assert_eq!(Value::map(m).to_string(), "{a: 1, b: hi}");
        assert_eq!(Value::ok(Value::Int(2)).to_string(), "Result.Ok(2)");
        assert_eq!(Value::Unit.to_string(), "()");
    }
}
