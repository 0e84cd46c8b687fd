//! Identifier directory: cluster/attribute/command id normalization.
//!
//! Everything that stores resources keys them by a canonical string. The
//! directory turns whatever the caller supplied (a number from the cluster
//! library, a symbolic key, a numeric string) into that key, and answers
//! whether an id belongs to a cluster's schema.
//!
//! Resolution is permissive: an id the directory does not know is returned
//! unchanged, never rejected. Only schema validation in `init` consults the
//! membership predicates.
//!
//! Two resolvers ship with the crate:
//! - [`Directory`]: table-driven, loaded from YAML/JSON or the embedded
//!   ZCL subset ([`Directory::builtin`]).
//! - [`PassthroughResolver`]: knows nothing; every id falls back.

pub mod table;

use serde::{Deserialize, Serialize};

use crate::types::ident::Id;

pub use table::{ClusterTable, Directory};

/// A resolved directory entry: canonical key plus numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub key: String,
    pub value: u32,
}

impl DirectoryEntry {
    /// Entry for `key` with numeric id `value`.
    pub fn new(key: impl Into<String>, value: u32) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Resolves ids to canonical keys and reports schema membership.
///
/// Implementors provide the four lookups; the key and membership helpers
/// are derived from them and apply the fallback policy.
pub trait KeyResolver: Send + Sync {
    /// Look up a cluster by numeric id or key.
    fn cluster(&self, cid: &Id) -> Option<DirectoryEntry>;

    /// Look up an attribute of the cluster with canonical key `cid`.
    fn attr(&self, cid: &str, aid: &Id) -> Option<DirectoryEntry>;

    /// Look up a functional command of the cluster.
    fn command(&self, cid: &str, cmd: &Id) -> Option<DirectoryEntry>;

    /// Look up a command response of the cluster.
    fn command_response(&self, cid: &str, cmd: &Id) -> Option<DirectoryEntry>;

    fn cluster_key(&self, cid: &Id) -> String {
        self.cluster(cid)
            .map(|e| e.key)
            .unwrap_or_else(|| cid.to_string())
    }

    /// Numeric cluster id, or the input unchanged when unknown.
    fn cluster_num(&self, cid: &Id) -> Id {
        self.cluster(cid)
            .map(|e| Id::Num(e.value))
            .unwrap_or_else(|| cid.clone())
    }

    fn attr_key(&self, cid: &str, aid: &Id) -> String {
        self.attr(cid, aid)
            .map(|e| e.key)
            .unwrap_or_else(|| aid.to_string())
    }

    fn command_key(&self, cid: &str, cmd: &Id) -> String {
        self.command(cid, cmd)
            .map(|e| e.key)
            .unwrap_or_else(|| cmd.to_string())
    }

    fn command_response_key(&self, cid: &str, cmd: &Id) -> String {
        self.command_response(cid, cmd)
            .map(|e| e.key)
            .unwrap_or_else(|| cmd.to_string())
    }

    fn is_cluster(&self, cid: &Id) -> bool {
        self.cluster(cid).is_some()
    }

    fn is_attr(&self, cid: &str, aid: &Id) -> bool {
        self.attr(cid, aid).is_some()
    }

    fn is_command(&self, cid: &str, cmd: &Id) -> bool {
        self.command(cid, cmd).is_some()
    }

    fn is_command_response(&self, cid: &str, cmd: &Id) -> bool {
        self.command_response(cid, cmd).is_some()
    }
}

/// Resolver with an empty directory.
///
/// Every id resolves to itself and no id is a schema member, so schema
/// validation must be disabled when registering resources through it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughResolver;

impl KeyResolver for PassthroughResolver {
    fn cluster(&self, _cid: &Id) -> Option<DirectoryEntry> {
        None
    }

    fn attr(&self, _cid: &str, _aid: &Id) -> Option<DirectoryEntry> {
        None
    }

    fn command(&self, _cid: &str, _cmd: &Id) -> Option<DirectoryEntry> {
        None
    }

    fn command_response(&self, _cid: &str, _cmd: &Id) -> Option<DirectoryEntry> {
        None
    }
}
