//! # ziee
//!
//! Resource registry for cluster-based smart objects.
//!
//! A smart object exposes clusters (on/off, level control, temperature
//! measurement, ...). Each cluster holds up to five resource groups:
//! a direction flag (`dir`), attribute values (`attrs`), attribute access
//! flags (`acls`), commands (`cmds`) and command responses (`cmdRsps`).
//! Resources are plain data or callback-backed handlers that run user code
//! on read, write or exec.
//!
//! ```ignore
//! use ziee::{Registry, CommandKind, Resource, exec_fn};
//! use serde_json::json;
//!
//! let mut reg = Registry::default();
//! reg.init_json("genOnOff", "dir", json!({"value": 1}), true)?;
//! reg.init_json("genOnOff", "attrs", json!({"onOff": 0}), true)?;
//! reg.init("genOnOff", "cmds", [("toggle", Resource::function(exec_fn(|_| async {
//!     Ok(json!(null))
//! })))], true)?;
//!
//! let on_off = reg.read("genOnOff", "onOff").await?;
//! reg.exec(CommandKind::Cmd, 6u32, "toggle", json!({})).await?;
//! ```

pub mod directory;
pub mod error;
pub mod profile;
pub mod registry;
pub mod resource;
pub mod spec;
pub mod types;

pub use directory::{Directory, DirectoryEntry, KeyResolver, PassthroughResolver};
pub use error::{ErrorKind, HandlerError, HandlerResult, Result, ZieeError};
pub use profile::{DeviceProfile, ProfileLoader};
pub use registry::{Cluster, ClusterList, CommandKind, DumpScope, Registry};
pub use resource::{
    exec_fn, read_fn, write_fn, Callback, ExecArgs, ExecHandler, HostRef, ReadHandler, Resource,
    WriteHandler,
};
pub use spec::Spec;
pub use types::ident::{Id, Sid};
