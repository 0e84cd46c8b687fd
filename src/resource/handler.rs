//! Handler traits for callback-backed resources.
//!
//! A callback resource defers read/write/exec to user code. Each capability
//! is an async trait so handlers may suspend (talk to hardware, wait on a
//! channel). Closures can be used through [`read_fn`], [`write_fn`] and
//! [`exec_fn`].

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::error::HandlerResult;
use crate::spec::Spec;

/// Reference to the hosting application, forwarded to exec handlers.
pub type HostRef = Arc<dyn Any + Send + Sync>;

/// Ordered arguments of an exec call: the host reference first, then the
/// positional values (normally a single argument object).
#[derive(Clone, Default)]
pub struct ExecArgs {
    pub host: Option<HostRef>,
    pub args: Vec<Value>,
}

impl ExecArgs {
    /// Bundle the host reference and positional values.
    pub fn new(host: Option<HostRef>, args: Vec<Value>) -> Self {
        Self { host, args }
    }

    /// Downcast the host reference to a concrete application type.
    pub fn host_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.host.clone().and_then(|h| h.downcast::<T>().ok())
    }

    /// The argument object (first positional value), or `Null`.
    pub fn arg_object(&self) -> &Value {
        self.args.first().unwrap_or(&Value::Null)
    }
}

impl fmt::Debug for ExecArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecArgs")
            .field("host", &self.host.is_some())
            .field("args", &self.args)
            .finish()
    }
}

/// Produces the current value of a resource.
#[async_trait]
pub trait ReadHandler: Send + Sync {
    async fn read(&self) -> HandlerResult;
}

/// Accepts a new value for a resource; returns the value written
/// (or `Null` when there is nothing to report).
#[async_trait]
pub trait WriteHandler: Send + Sync {
    async fn write(&self, value: Value) -> HandlerResult;
}

/// Executes a command. `spec` is the group the command lives in.
#[async_trait]
pub trait ExecHandler: Send + Sync {
    async fn exec(&self, spec: &Spec, args: ExecArgs) -> HandlerResult;
}

// ===========================================================================
// Closure adapters
// ===========================================================================

type ReadFn = Box<dyn Fn() -> BoxFuture<'static, HandlerResult> + Send + Sync>;
type WriteFn = Box<dyn Fn(Value) -> BoxFuture<'static, HandlerResult> + Send + Sync>;
type ExecFn = Box<dyn Fn(ExecArgs) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

struct FnRead(ReadFn);
struct FnWrite(WriteFn);
struct FnExec(ExecFn);

#[async_trait]
impl ReadHandler for FnRead {
    async fn read(&self) -> HandlerResult {
        (self.0)().await
    }
}

#[async_trait]
impl WriteHandler for FnWrite {
    async fn write(&self, value: Value) -> HandlerResult {
        (self.0)(value).await
    }
}

#[async_trait]
impl ExecHandler for FnExec {
    async fn exec(&self, _spec: &Spec, args: ExecArgs) -> HandlerResult {
        (self.0)(args).await
    }
}

/// Wrap an async closure as a [`ReadHandler`].
pub fn read_fn<F, Fut>(f: F) -> Arc<dyn ReadHandler>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnRead(Box::new(move || f().boxed())))
}

/// Wrap an async closure as a [`WriteHandler`].
pub fn write_fn<F, Fut>(f: F) -> Arc<dyn WriteHandler>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnWrite(Box::new(move |v| f(v).boxed())))
}

/// Wrap an async closure as an [`ExecHandler`]. The closure does not see
/// the owning spec; implement [`ExecHandler`] directly when it needs to.
pub fn exec_fn<F, Fut>(f: F) -> Arc<dyn ExecHandler>
where
    F: Fn(ExecArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnExec(Box::new(move |args| f(args).boxed())))
}
