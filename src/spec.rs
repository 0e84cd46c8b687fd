//! Spec: the resource container for one (cluster, group kind) pair.
//!
//! A spec owns its resources in insertion order and enforces the per-kind
//! rules when they are stored:
//!
//! | kind      | key resolution        | accepted values                         |
//! |-----------|-----------------------|-----------------------------------------|
//! | `dir`     | literal `value`       | a number                                |
//! | `attrs`   | attribute lookup      | data or callback, not a bare callable   |
//! | `acls`    | attribute lookup      | `R`, `W`, `RW`, `WR` (any case)         |
//! | `cmds`    | command lookup        | callback with `exec`, or bare callable  |
//! | `cmdRsps` | command response      | callback with `exec`, or bare callable  |
//! | custom    | literal               | anything                                |
//!
//! `read`/`write`/`exec` go through the capability contract and may call
//! into user handlers. `dump_sync` never does.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::directory::KeyResolver;
use crate::error::{Result, ZieeError};
use crate::resource::{Callback, ExecArgs, Resource};
use crate::types::ident::{Id, Sid};

const ACL_FLAGS: [&str; 4] = ["R", "W", "RW", "WR"];

/// Resource container for one cluster group.
#[derive(Clone)]
pub struct Spec {
    cid: String,
    sid: Sid,
    resolver: Arc<dyn KeyResolver>,
    resources: IndexMap<String, Resource>,
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("cid", &self.cid)
            .field("sid", &self.sid)
            .field("resources", &self.resources)
            .finish()
    }
}

impl Spec {
    /// Create an empty spec. `cid` must already be the canonical cluster key.
    pub fn new(cid: impl Into<String>, sid: impl Into<Sid>, resolver: Arc<dyn KeyResolver>) -> Self {
        Self {
            cid: cid.into(),
            sid: sid.into(),
            resolver,
            resources: IndexMap::new(),
        }
    }

    /// Canonical cluster key.
    pub fn cid(&self) -> &str {
        &self.cid
    }

    /// Group kind.
    pub fn sid(&self) -> &Sid {
        &self.sid
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no resource is stored.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Canonical resource keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Resources with their canonical keys, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Canonical key for `rid` according to this spec's kind.
    pub fn resolve_key(&self, rid: &Id) -> String {
        match self.sid {
            Sid::Attrs | Sid::Acls => self.resolver.attr_key(&self.cid, rid),
            Sid::Cmds => self.resolver.command_key(&self.cid, rid),
            Sid::CmdRsps => self.resolver.command_response_key(&self.cid, rid),
            Sid::Dir | Sid::Custom(_) => rid.to_string(),
        }
    }

    fn path(&self, key: &str) -> String {
        format!("{}/{}/{}", self.cid, self.sid, key)
    }

    // =======================================================================
    // Getter and setter
    // =======================================================================

    /// Whether a resource is stored under `rid`.
    pub fn has(&self, rid: impl Into<Id>) -> bool {
        let key = self.resolve_key(&rid.into());
        self.resources.contains_key(&key)
    }

    /// Stored resource under `rid`, without invoking handlers.
    pub fn get(&self, rid: impl Into<Id>) -> Option<&Resource> {
        let key = self.resolve_key(&rid.into());
        self.resources.get(&key)
    }

    /// Stored data of a `Raw`/`Static` resource.
    pub fn get_value(&self, rid: impl Into<Id>) -> Option<Value> {
        self.get(rid).and_then(Resource::as_value)
    }

    /// Validate and store a resource, replacing any previous one.
    pub fn set(&mut self, rid: impl Into<Id>, value: impl Into<Resource>) -> Result<&mut Self> {
        let (key, resource) = self.prepare(&rid.into(), value.into())?;
        log::trace!("set {}", self.path(&key));
        self.resources.insert(key, resource);
        Ok(self)
    }

    /// Apply the per-kind rules to `resource` without storing it.
    fn prepare(&self, rid: &Id, resource: Resource) -> Result<(String, Resource)> {
        let resource = resource.normalized();

        if let Resource::Callback(cb) = &resource {
            if cb.is_empty() {
                return Err(ZieeError::invalid(format!(
                    "Callback resource {} has no read, write or exec handler",
                    self.path(&rid.to_string())
                )));
            }
        }

        match &self.sid {
            Sid::Dir => {
                if rid.as_key() != Some("value") {
                    return Err(ZieeError::invalid(
                        "Direction should be named with key 'value'",
                    ));
                }
                match resource {
                    Resource::Raw(Value::Number(_)) => Ok(("value".to_string(), resource)),
                    _ => Err(ZieeError::invalid("dir.value should be a number")),
                }
            }
            Sid::Attrs => {
                if resource.is_function() {
                    return Err(ZieeError::invalid("Attribute cannot be a bare function"));
                }
                Ok((self.resolve_key(rid), resource))
            }
            Sid::Acls => {
                let flag = match &resource {
                    Resource::Raw(Value::String(s)) => s.to_uppercase(),
                    _ => {
                        return Err(ZieeError::invalid(
                            "Only strings of R, W, RW are accepted",
                        ))
                    }
                };
                if !ACL_FLAGS.contains(&flag.as_str()) {
                    return Err(ZieeError::invalid(format!(
                        "Only strings of R, W, RW are accepted, got '{}'",
                        flag
                    )));
                }
                Ok((self.resolve_key(rid), Resource::Raw(Value::String(flag))))
            }
            Sid::Cmds | Sid::CmdRsps => {
                let resource = match resource {
                    Resource::Function(f) => Resource::Callback(Callback::new().with_exec(f)),
                    Resource::Callback(cb) if cb.has_exec() => Resource::Callback(cb),
                    _ => {
                        return Err(ZieeError::invalid(
                            "A command should be a function or expose exec",
                        ))
                    }
                };
                Ok((self.resolve_key(rid), resource))
            }
            Sid::Custom(_) => Ok((rid.to_string(), resource)),
        }
    }

    /// Remove every resource; `cid`/`sid` are kept.
    pub fn clear(&mut self) -> &mut Self {
        if !self.resources.is_empty() {
            log::debug!("clear {}/{} ({} resources)", self.cid, self.sid, self.resources.len());
        }
        self.resources.clear();
        self
    }

    // =======================================================================
    // Bulk initialization
    // =======================================================================

    /// Replace all resources with `resources`.
    ///
    /// The spec is cleared first. With `validate` set, every id of an
    /// `attrs`/`acls`/`cmds`/`cmdRsps` spec must belong to the cluster's
    /// schema. Nothing is stored unless every entry passes.
    pub fn init<K, V, I>(&mut self, resources: I, validate: bool) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Id>,
        V: Into<Resource>,
    {
        self.clear();

        let entries: Vec<(Id, Resource)> = resources
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if self.sid == Sid::Dir {
            let only_value = entries.len() == 1 && entries[0].0.as_key() == Some("value");
            if !only_value {
                return Err(ZieeError::invalid(
                    "Direction should be an object with an only key named 'value'",
                ));
            }
        }

        let mut staged = IndexMap::with_capacity(entries.len());
        for (rid, resource) in entries {
            if validate {
                self.check_schema(&rid)?;
            }
            let (key, resource) = self.prepare(&rid, resource)?;
            staged.insert(key, resource);
        }

        log::debug!("init {}/{} with {} resources", self.cid, self.sid, staged.len());
        self.resources = staged;
        Ok(self)
    }

    /// [`init`](Self::init) from a JSON object of data-only resources.
    pub fn init_json(&mut self, payload: Value, validate: bool) -> Result<&mut Self> {
        self.clear();
        match payload {
            Value::Object(map) => {
                self.init(map.into_iter().map(|(k, v)| (Id::parse(&k), v)), validate)
            }
            _ => Err(ZieeError::invalid(format!(
                "Resources of {}/{} should be wrapped in an object",
                self.cid, self.sid
            ))),
        }
    }

    fn check_schema(&self, rid: &Id) -> Result<()> {
        let known = match self.sid {
            Sid::Attrs | Sid::Acls => self.resolver.is_attr(&self.cid, rid),
            Sid::Cmds => self.resolver.is_command(&self.cid, rid),
            Sid::CmdRsps => self.resolver.is_command_response(&self.cid, rid),
            Sid::Dir | Sid::Custom(_) => true,
        };
        if known {
            Ok(())
        } else {
            Err(ZieeError::invalid(format!(
                "Id {} is not defined for {} of cluster {}",
                rid, self.sid, self.cid
            )))
        }
    }

    // =======================================================================
    // Dump
    // =======================================================================

    /// Materialize every resource through `read`, one at a time in
    /// registration order. The first failing read fails the dump.
    pub async fn dump(&self) -> Result<Map<String, Value>> {
        let mut dumped = Map::new();
        for (key, resource) in &self.resources {
            let value = self.read_resource(key, resource).await?;
            dumped.insert(key.clone(), value);
        }
        Ok(dumped)
    }

    /// Snapshot without invoking user code: callbacks appear as capability
    /// placeholders, bare callables are left out.
    pub fn dump_sync(&self) -> Map<String, Value> {
        self.resources
            .iter()
            .filter_map(|(key, resource)| resource.snapshot().map(|v| (key.clone(), v)))
            .collect()
    }

    // =======================================================================
    // Read / write / exec
    // =======================================================================

    /// Read a resource through its capability contract.
    pub async fn read(&self, rid: impl Into<Id>) -> Result<Value> {
        let key = self.resolve_key(&rid.into());
        match self.resources.get(&key) {
            Some(resource) => self.read_resource(&key, resource).await,
            None => Err(ZieeError::NotFound(self.path(&key))),
        }
    }

    async fn read_resource(&self, key: &str, resource: &Resource) -> Result<Value> {
        log::trace!("read {}", self.path(key));
        match resource {
            Resource::Raw(v) => Ok(v.clone()),
            Resource::Static(map) => Ok(Value::Object(map.clone())),
            Resource::Function(_) => Err(ZieeError::NotFound(self.path(key))),
            Resource::Callback(cb) => {
                if cb.has_exec() && !cb.has_read() && !cb.has_write() {
                    return Err(ZieeError::ExecOnly(self.path(key)));
                }
                let handler = cb
                    .read
                    .clone()
                    .ok_or_else(|| ZieeError::Unreadable(self.path(key)))?;
                handler.read().await.map_err(ZieeError::Handler)
            }
        }
    }

    /// Write a value. Data resources are replaced through [`set`](Self::set)
    /// (so the kind's rules apply); callbacks get the value handed to their
    /// write handler.
    pub async fn write(&mut self, rid: impl Into<Id>, value: Value) -> Result<Value> {
        let rid = rid.into();
        let key = self.resolve_key(&rid);
        log::trace!("write {}", self.path(&key));

        let handler = match self.resources.get(&key) {
            None | Some(Resource::Function(_)) => {
                return Err(ZieeError::NotFound(self.path(&key)))
            }
            Some(Resource::Raw(_)) | Some(Resource::Static(_)) => None,
            Some(Resource::Callback(cb)) => {
                if cb.has_exec() && !cb.has_read() && !cb.has_write() {
                    return Err(ZieeError::ExecOnly(self.path(&key)));
                }
                match &cb.write {
                    Some(w) => Some(w.clone()),
                    None => return Err(ZieeError::Unwritable(self.path(&key))),
                }
            }
        };

        match handler {
            Some(w) => w.write(value).await.map_err(ZieeError::Handler),
            None => {
                self.set(rid, value.clone())?;
                Ok(value)
            }
        }
    }

    /// Run a resource's exec handler with this spec as receiver.
    pub async fn exec(&self, rid: impl Into<Id>, args: ExecArgs) -> Result<Value> {
        let key = self.resolve_key(&rid.into());
        let handler = match self.resources.get(&key) {
            None => return Err(ZieeError::NotFound(self.path(&key))),
            Some(Resource::Callback(cb)) => cb.exec.clone(),
            Some(_) => None,
        }
        .ok_or_else(|| ZieeError::Unexecutable(self.path(&key)))?;

        log::trace!("exec {}", self.path(&key));
        handler.exec(self, args).await.map_err(ZieeError::Handler)
    }
}
