//! Resource variants stored in a [`Spec`](crate::Spec).
//!
//! The shape of a resource is decided once, when it is stored, and only
//! capability presence is checked on access:
//!
//! - [`Resource::Raw`]: a non-object JSON value (number, string, bool, array, null).
//! - [`Resource::Static`]: a plain JSON object.
//! - [`Resource::Callback`]: read/write/exec deferred to user handlers.
//! - [`Resource::Function`]: a bare callable. Command groups wrap it into a
//!   callback with only `exec`; elsewhere it is stored but never readable.

pub mod handler;

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

pub use handler::{
    exec_fn, read_fn, write_fn, ExecArgs, ExecHandler, HostRef, ReadHandler, WriteHandler,
};

/// Placeholder written by `dump_sync` for a present read handler.
pub const READ_PLACEHOLDER: &str = "_read_";
/// Placeholder written by `dump_sync` for a present write handler.
pub const WRITE_PLACEHOLDER: &str = "_write_";
/// Placeholder written by `dump_sync` for a present exec handler.
pub const EXEC_PLACEHOLDER: &str = "_exec_";

/// A callback-backed resource. At least one capability must be present.
#[derive(Clone, Default)]
pub struct Callback {
    pub read: Option<Arc<dyn ReadHandler>>,
    pub write: Option<Arc<dyn WriteHandler>>,
    pub exec: Option<Arc<dyn ExecHandler>>,
}

impl Callback {
    /// A callback with no capability yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a read handler.
    pub fn with_read(mut self, handler: Arc<dyn ReadHandler>) -> Self {
        self.read = Some(handler);
        self
    }

    /// Attach a write handler.
    pub fn with_write(mut self, handler: Arc<dyn WriteHandler>) -> Self {
        self.write = Some(handler);
        self
    }

    /// Attach an exec handler.
    pub fn with_exec(mut self, handler: Arc<dyn ExecHandler>) -> Self {
        self.exec = Some(handler);
        self
    }

    /// Whether a read handler is attached.
    pub fn has_read(&self) -> bool {
        self.read.is_some()
    }

    /// Whether a write handler is attached.
    pub fn has_write(&self) -> bool {
        self.write.is_some()
    }

    /// Whether an exec handler is attached.
    pub fn has_exec(&self) -> bool {
        self.exec.is_some()
    }

    /// True when no capability is set; such a callback cannot be stored.
    pub fn is_empty(&self) -> bool {
        !self.has_read() && !self.has_write() && !self.has_exec()
    }

    /// Capability placeholders, in read/write/exec order.
    pub fn placeholders(&self) -> Map<String, Value> {
        let mut out = Map::new();
        if self.has_read() {
            out.insert("read".into(), Value::from(READ_PLACEHOLDER));
        }
        if self.has_write() {
            out.insert("write".into(), Value::from(WRITE_PLACEHOLDER));
        }
        if self.has_exec() {
            out.insert("exec".into(), Value::from(EXEC_PLACEHOLDER));
        }
        out
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("read", &self.has_read())
            .field("write", &self.has_write())
            .field("exec", &self.has_exec())
            .finish()
    }
}

/// A stored resource.
#[derive(Clone)]
pub enum Resource {
    Raw(Value),
    Static(Map<String, Value>),
    Callback(Callback),
    Function(Arc<dyn ExecHandler>),
}

impl Resource {
    /// Classify a JSON value: objects become `Static`, everything else `Raw`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Resource::Static(map),
            other => Resource::Raw(other),
        }
    }

    /// A bare callable.
    pub fn function(handler: Arc<dyn ExecHandler>) -> Self {
        Resource::Function(handler)
    }

    /// A command resource: a callback with only `exec` set.
    pub fn command(handler: Arc<dyn ExecHandler>) -> Self {
        Resource::Callback(Callback::new().with_exec(handler))
    }

    /// Whether this is a callback resource.
    pub fn is_callback(&self) -> bool {
        matches!(self, Resource::Callback(_))
    }

    /// Whether this is a bare callable.
    pub fn is_function(&self) -> bool {
        matches!(self, Resource::Function(_))
    }

    /// The callback, if this is one.
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Resource::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    /// The stored data for `Raw`/`Static` resources.
    pub fn as_value(&self) -> Option<Value> {
        match self {
            Resource::Raw(v) => Some(v.clone()),
            Resource::Static(map) => Some(Value::Object(map.clone())),
            _ => None,
        }
    }

    /// Copy of the resource that never touches user code: data as-is,
    /// callbacks as capability placeholders, bare callables omitted.
    pub fn snapshot(&self) -> Option<Value> {
        match self {
            Resource::Raw(v) => Some(v.clone()),
            Resource::Static(map) => Some(Value::Object(map.clone())),
            Resource::Callback(cb) => Some(Value::Object(cb.placeholders())),
            Resource::Function(_) => None,
        }
    }

    /// Normalize a resource built by hand: a `Raw` object is really `Static`.
    pub(crate) fn normalized(self) -> Self {
        match self {
            Resource::Raw(Value::Object(map)) => Resource::Static(map),
            other => other,
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Raw(v) => f.debug_tuple("Raw").field(v).finish(),
            Resource::Static(m) => f.debug_tuple("Static").field(m).finish(),
            Resource::Callback(cb) => f.debug_tuple("Callback").field(cb).finish(),
            Resource::Function(_) => f.write_str("Function"),
        }
    }
}

impl From<Value> for Resource {
    fn from(value: Value) -> Self {
        Resource::from_value(value)
    }
}

impl From<Callback> for Resource {
    fn from(cb: Callback) -> Self {
        Resource::Callback(cb)
    }
}

impl From<Arc<dyn ExecHandler>> for Resource {
    fn from(handler: Arc<dyn ExecHandler>) -> Self {
        Resource::Function(handler)
    }
}

macro_rules! resource_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Resource {
                fn from(v: $t) -> Self {
                    Resource::Raw(Value::from(v))
                }
            }
        )*
    };
}

resource_from_scalar!(bool, i32, i64, u8, u16, u32, u64, f64, &str, String);
