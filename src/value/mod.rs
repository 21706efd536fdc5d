mod thenable;

use std::fmt;
use std::rc::Rc;

use crate::deferred::Deferred;
use crate::errors::DeferredError;

pub use thenable::{ForeignThenable, SettledCallback, ThenMethod};

/// Dynamic payload and outcome type. A settled deferred stores one of
/// these, handlers receive and return them, and the resolution procedure
/// dispatches on the variant: `Deferred` is adopted, `Foreign` is probed,
/// everything else settles as-is.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Error(DeferredError),
    Deferred(Deferred),
    Foreign(Rc<dyn ForeignThenable>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Error(err) => write!(f, "Error({err})"),
            Value::Deferred(deferred) => write!(f, "Deferred(<{:?}>)", deferred.state()),
            Value::Foreign(_) => write!(f, "Foreign(<thenable>)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            // Reference types compare by identity.
            (Value::Deferred(a), Value::Deferred(b)) => a.same_cell(b),
            (Value::Foreign(a), Value::Foreign(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const u8, Rc::as_ptr(b) as *const u8)
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<DeferredError> for Value {
    fn from(err: DeferredError) -> Self {
        Value::Error(err)
    }
}

impl From<Deferred> for Value {
    fn from(deferred: Deferred) -> Self {
        Value::Deferred(deferred)
    }
}
