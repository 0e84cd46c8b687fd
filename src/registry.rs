//! Registry of clusters and their resource groups.
//!
//! The registry maps canonical cluster keys to [`Cluster`]s, each holding up
//! to one [`Spec`] per group kind. Resource-level behavior lives in `Spec`;
//! the registry adds navigation, host binding, direction classification and
//! scoped dumps.
//!
//! Structural changes (`create`, `init`) are refused once the registry is
//! glued to a host application. Value changes (`set`, `write`) are not.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::directory::{Directory, KeyResolver};
use crate::error::{Result, ZieeError};
use crate::resource::{ExecArgs, HostRef, Resource};
use crate::spec::Spec;
use crate::types::ident::{Id, Sid};

/// Direction bit: server side (input) cluster.
pub const DIR_IN: i64 = 0x01;
/// Direction bit: client side (output) cluster.
pub const DIR_OUT: i64 = 0x02;

// ===========================================================================
// Cluster
// ===========================================================================

/// The resource groups of one cluster, in creation order.
#[derive(Debug, Clone)]
pub struct Cluster {
    key: String,
    specs: IndexMap<Sid, Spec>,
}

impl Cluster {
    fn new(key: String) -> Self {
        Self {
            key,
            specs: IndexMap::new(),
        }
    }

    /// Canonical cluster key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Group of kind `sid`.
    pub fn get(&self, sid: impl Into<Sid>) -> Option<&Spec> {
        self.specs.get(&sid.into())
    }

    /// Mutable group of kind `sid`.
    pub fn get_mut(&mut self, sid: impl Into<Sid>) -> Option<&mut Spec> {
        self.specs.get_mut(&sid.into())
    }

    /// Groups in creation order.
    pub fn specs(&self) -> impl Iterator<Item = &Spec> {
        self.specs.values()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the cluster has no group.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Direction flag stored in the `dir` group, if any. Fractional values
    /// are truncated; negative values keep their two's-complement bits.
    pub fn direction(&self) -> Option<i64> {
        let value = self.get(Sid::Dir)?.get_value("value")?;
        value
            .as_i64()
            .or_else(|| value.as_u64().map(|n| n as i64))
            .or_else(|| value.as_f64().map(|f| f as i64))
    }

    /// Snapshot of every group without invoking handlers.
    pub fn dump_sync(&self) -> Map<String, Value> {
        self.specs
            .iter()
            .map(|(sid, spec)| (sid.to_string(), Value::Object(spec.dump_sync())))
            .collect()
    }

    /// Dump every group in creation order, one at a time.
    pub async fn dump(&self) -> Result<Map<String, Value>> {
        let mut dumped = Map::new();
        for (sid, spec) in &self.specs {
            let resources = spec.dump().await?;
            dumped.insert(sid.to_string(), Value::Object(resources));
        }
        Ok(dumped)
    }
}

// ===========================================================================
// Scopes and command kinds
// ===========================================================================

/// What a dump covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DumpScope {
    /// Every cluster and group.
    #[default]
    All,
    /// One cluster's groups.
    Cluster(Id),
    /// Exactly one group.
    Spec(Id, Sid),
}

impl DumpScope {
    /// Build a scope from a path of zero, one or two segments
    /// (`[]`, `[cid]`, `[cid, sid]`).
    pub fn from_path(path: &[&str]) -> Result<Self> {
        match path {
            [] => Ok(DumpScope::All),
            [cid] => Ok(DumpScope::Cluster(Id::parse(cid))),
            [cid, sid] => Ok(DumpScope::Spec(Id::parse(cid), Sid::from(*sid))),
            _ => Err(ZieeError::invalid(format!(
                "Bad dump path of {} segments, expected at most cluster and group",
                path.len()
            ))),
        }
    }
}

/// Which command group an exec call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Functional command (`cmds`).
    Cmd,
    /// Command response (`cmdRsps`).
    CmdRsp,
}

impl CommandKind {
    /// Group kind holding commands of this kind.
    pub fn sid(&self) -> Sid {
        match self {
            CommandKind::Cmd => Sid::Cmds,
            CommandKind::CmdRsp => Sid::CmdRsps,
        }
    }
}

impl FromStr for CommandKind {
    type Err = ZieeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cmd" => Ok(CommandKind::Cmd),
            "cmdRsp" => Ok(CommandKind::CmdRsp),
            other => Err(ZieeError::invalid(format!(
                "Command kind should be 'cmd' or 'cmdRsp', got '{}'",
                other
            ))),
        }
    }
}

/// Numeric ids of clusters by direction, from [`Registry::cluster_list`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterList {
    #[serde(rename = "in")]
    pub in_clusters: Vec<Id>,
    #[serde(rename = "out")]
    pub out_clusters: Vec<Id>,
}

// ===========================================================================
// Registry
// ===========================================================================

/// Clusters of one smart object.
pub struct Registry {
    resolver: Arc<dyn KeyResolver>,
    clusters: IndexMap<String, Cluster>,
    host: Option<HostRef>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("clusters", &self.clusters)
            .field("glued", &self.host.is_some())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(Directory::builtin()))
    }
}

impl Registry {
    /// Create an empty registry resolving ids through `resolver`.
    pub fn new(resolver: Arc<dyn KeyResolver>) -> Self {
        Self {
            resolver,
            clusters: IndexMap::new(),
            host: None,
        }
    }

    /// Resolver used for every id.
    pub fn resolver(&self) -> &Arc<dyn KeyResolver> {
        &self.resolver
    }

    /// Clusters in creation order.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether no cluster has been created.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Numeric cluster id, or the id unchanged when the directory does not know it.
    pub fn cluster_num(&self, cid: impl Into<Id>) -> Id {
        self.resolver.cluster_num(&cid.into())
    }

    fn cluster_key(&self, cid: impl Into<Id>) -> String {
        self.resolver.cluster_key(&cid.into())
    }

    // =======================================================================
    // Structure
    // =======================================================================

    /// Create an empty group for `(cid, sid)`.
    pub fn create(&mut self, cid: impl Into<Id>, sid: impl Into<Sid>) -> Result<&mut Spec> {
        if self.host.is_some() {
            return Err(ZieeError::StructuralChangeForbidden(
                "create a new cluster group".into(),
            ));
        }

        let key = self.cluster_key(cid);
        let sid = sid.into();
        let cluster = self
            .clusters
            .entry(key.clone())
            .or_insert_with(|| Cluster::new(key.clone()));

        if cluster.specs.contains_key(&sid) {
            return Err(ZieeError::AlreadyExists {
                cid: key,
                sid: sid.to_string(),
            });
        }

        log::debug!("create {}/{}", key, sid);
        let spec = Spec::new(key, sid.clone(), self.resolver.clone());
        Ok(cluster.specs.entry(sid).or_insert(spec))
    }

    fn find_or_create(&mut self, cid: Id, sid: Sid) -> Result<&mut Spec> {
        if self.host.is_some() {
            return Err(ZieeError::StructuralChangeForbidden("init again".into()));
        }
        let key = self.cluster_key(&cid);
        let exists = self
            .clusters
            .get(&key)
            .map_or(false, |c| c.specs.contains_key(&sid));
        if exists {
            self.find_spec_mut(cid, sid)
                .ok_or_else(|| ZieeError::NotFound(key))
        } else {
            self.create(cid, sid)
        }
    }

    /// Replace the resources of `(cid, sid)`, creating the group if needed.
    pub fn init<K, V, I>(
        &mut self,
        cid: impl Into<Id>,
        sid: impl Into<Sid>,
        resources: I,
        validate: bool,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Id>,
        V: Into<Resource>,
    {
        self.find_or_create(cid.into(), sid.into())?
            .init(resources, validate)?;
        Ok(self)
    }

    /// [`init`](Self::init) from a JSON object of data-only resources.
    pub fn init_json(
        &mut self,
        cid: impl Into<Id>,
        sid: impl Into<Sid>,
        resources: Value,
        validate: bool,
    ) -> Result<&mut Self> {
        self.find_or_create(cid.into(), sid.into())?
            .init_json(resources, validate)?;
        Ok(self)
    }

    /// Bind the host application forwarded to exec handlers.
    ///
    /// Gluing again replaces the host; only `create`/`init` are locked.
    pub fn glue(&mut self, host: HostRef) -> &mut Self {
        if self.host.is_some() {
            log::warn!("Registry glued again, replacing the previous host");
        } else {
            log::debug!("Registry glued with {} clusters", self.clusters.len());
        }
        self.host = Some(host);
        self
    }

    /// Host reference set by [`glue`](Self::glue).
    pub fn host(&self) -> Option<&HostRef> {
        self.host.as_ref()
    }

    /// Whether a host has been glued.
    pub fn is_glued(&self) -> bool {
        self.host.is_some()
    }

    // =======================================================================
    // Navigation
    // =======================================================================

    /// Whether the cluster exists.
    pub fn has_cluster(&self, cid: impl Into<Id>) -> bool {
        self.find_cluster(cid).is_some()
    }

    /// Whether the group `(cid, sid)` exists.
    pub fn has_spec(&self, cid: impl Into<Id>, sid: impl Into<Sid>) -> bool {
        self.find_spec(cid, sid).is_some()
    }

    /// Whether the resource exists in group `(cid, sid)`.
    pub fn has(&self, cid: impl Into<Id>, sid: impl Into<Sid>, rid: impl Into<Id>) -> bool {
        self.find_spec(cid, sid).map_or(false, |s| s.has(rid))
    }

    /// Look up a cluster without creating it.
    pub fn find_cluster(&self, cid: impl Into<Id>) -> Option<&Cluster> {
        self.clusters.get(&self.cluster_key(cid))
    }

    /// Mutable cluster lookup; never creates.
    pub fn find_cluster_mut(&mut self, cid: impl Into<Id>) -> Option<&mut Cluster> {
        let key = self.cluster_key(cid);
        self.clusters.get_mut(&key)
    }

    /// Look up a group without creating it.
    pub fn find_spec(&self, cid: impl Into<Id>, sid: impl Into<Sid>) -> Option<&Spec> {
        self.find_cluster(cid).and_then(|c| c.get(sid))
    }

    /// Mutable group lookup; never creates.
    pub fn find_spec_mut(&mut self, cid: impl Into<Id>, sid: impl Into<Sid>) -> Option<&mut Spec> {
        self.find_cluster_mut(cid).and_then(|c| c.get_mut(sid))
    }

    /// Stored resource at `(cid, sid, rid)`.
    pub fn get(&self, cid: impl Into<Id>, sid: impl Into<Sid>, rid: impl Into<Id>) -> Option<&Resource> {
        self.find_spec(cid, sid).and_then(|s| s.get(rid))
    }

    /// Set a resource in an existing group. Returns `false` when the group
    /// does not exist; validation failures are errors.
    pub fn set(
        &mut self,
        cid: impl Into<Id>,
        sid: impl Into<Sid>,
        rid: impl Into<Id>,
        value: impl Into<Resource>,
    ) -> Result<bool> {
        match self.find_spec_mut(cid, sid) {
            Some(spec) => {
                spec.set(rid, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Classify clusters by their `dir` flag: bit0 lists the numeric id in
    /// `in`, bit1 in `out`. Clusters without a direction are skipped.
    pub fn cluster_list(&self) -> ClusterList {
        let mut list = ClusterList::default();
        for (key, cluster) in &self.clusters {
            let Some(dir) = cluster.direction() else {
                continue;
            };
            let num = self.cluster_num(key);
            if dir & DIR_IN != 0 {
                list.in_clusters.push(num.clone());
            }
            if dir & DIR_OUT != 0 {
                list.out_clusters.push(num);
            }
        }
        list
    }

    // =======================================================================
    // Dump
    // =======================================================================

    /// Snapshot of `scope` without invoking handlers; `None` when the
    /// scoped cluster or group does not exist.
    pub fn dump_sync(&self, scope: &DumpScope) -> Option<Map<String, Value>> {
        match scope {
            DumpScope::All => Some(
                self.clusters
                    .iter()
                    .map(|(key, c)| (key.clone(), Value::Object(c.dump_sync())))
                    .collect(),
            ),
            DumpScope::Cluster(cid) => self.find_cluster(cid).map(Cluster::dump_sync),
            DumpScope::Spec(cid, sid) => self.find_spec(cid, sid).map(Spec::dump_sync),
        }
    }

    /// Read every resource of `scope`, cluster by cluster and group by group.
    pub async fn dump(&self, scope: &DumpScope) -> Result<Map<String, Value>> {
        match scope {
            DumpScope::All => {
                let mut dumped = Map::new();
                for (key, cluster) in &self.clusters {
                    let data = cluster.dump().await?;
                    dumped.insert(key.clone(), Value::Object(data));
                }
                Ok(dumped)
            }
            DumpScope::Cluster(cid) => match self.find_cluster(cid) {
                Some(cluster) => cluster.dump().await,
                None => Err(ZieeError::NotFound(format!("cluster {}", cid))),
            },
            DumpScope::Spec(cid, sid) => match self.find_spec(cid, sid) {
                Some(spec) => spec.dump().await,
                None => Err(ZieeError::NotFound(format!("{}/{}", cid, sid))),
            },
        }
    }

    // =======================================================================
    // Read / write / exec
    // =======================================================================

    /// Read an attribute of a cluster.
    pub async fn read(&self, cid: impl Into<Id>, attr_id: impl Into<Id>) -> Result<Value> {
        let cid = cid.into();
        match self.find_spec(&cid, Sid::Attrs) {
            Some(attrs) => attrs.read(attr_id).await,
            None => Err(ZieeError::NotFound(format!("attrs of cluster {}", cid))),
        }
    }

    /// Write an attribute of a cluster.
    pub async fn write(
        &mut self,
        cid: impl Into<Id>,
        attr_id: impl Into<Id>,
        value: Value,
    ) -> Result<Value> {
        let cid = cid.into();
        match self.find_spec_mut(&cid, Sid::Attrs) {
            Some(attrs) => attrs.write(attr_id, value).await,
            None => Err(ZieeError::NotFound(format!("attrs of cluster {}", cid))),
        }
    }

    /// Execute a command or command response. The handler receives the
    /// glued host first and `arg` (which must be a JSON object) second.
    pub async fn exec(
        &self,
        kind: CommandKind,
        cid: impl Into<Id>,
        cmd_id: impl Into<Id>,
        arg: Value,
    ) -> Result<Value> {
        if !arg.is_object() {
            return Err(ZieeError::invalid(
                "Command argument should be an object holding every parameter",
            ));
        }

        let cid = cid.into();
        let spec = self
            .find_spec(&cid, kind.sid())
            .ok_or_else(|| ZieeError::NotFound(format!("{} of cluster {}", kind.sid(), cid)))?;

        spec.exec(cmd_id, ExecArgs::new(self.host.clone(), vec![arg]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;
    use crate::resource::{exec_fn, read_fn, Callback};

    struct App {
        name: &'static str,
    }

    fn registry() -> Registry {
        Registry::default()
    }

    #[test]
    fn test_create_resolves_cluster_key() {
        let mut reg = registry();
        let spec = reg.create(6u32, "attrs").unwrap();
        assert_eq!(spec.cid(), "genOnOff");
        assert!(reg.has_cluster("genOnOff"));
        assert!(reg.has_spec(6u32, "attrs"));
        assert!(!reg.has_spec(6u32, "cmds"));
    }

    #[test]
    fn test_create_twice_fails() {
        let mut reg = registry();
        reg.create("genOnOff", "attrs").unwrap();
        let err = reg.create(6u32, "attrs").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_structural_changes_forbidden_after_glue() {
        let mut reg = registry();
        reg.create("genOnOff", "attrs").unwrap();
        reg.glue(Arc::new(App { name: "zapp" }));

        assert_eq!(
            reg.create("genLevelCtrl", "attrs").unwrap_err().kind(),
            ErrorKind::StructuralChangeForbidden
        );
        assert_eq!(
            reg.create("genOnOff", "attrs").unwrap_err().kind(),
            ErrorKind::StructuralChangeForbidden
        );
        assert_eq!(
            reg.init_json("genOnOff", "attrs", json!({"onOff": 1}), true)
                .unwrap_err()
                .kind(),
            ErrorKind::StructuralChangeForbidden
        );

        // value changes and re-gluing stay allowed
        assert!(reg.set("genOnOff", "attrs", "onOff", 1).unwrap());
        reg.glue(Arc::new(App { name: "other" }));
        assert!(reg.is_glued());
    }

    #[test]
    fn test_init_creates_and_replaces() {
        let mut reg = registry();
        reg.init_json("genOnOff", "attrs", json!({"onOff": 0, "onTime": 10}), true)
            .unwrap();
        reg.init_json("genOnOff", "attrs", json!({"onOff": 1}), true)
            .unwrap();
        let spec = reg.find_spec("genOnOff", "attrs").unwrap();
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.get_value("onOff"), Some(json!(1)));
    }

    #[test]
    fn test_navigation_never_creates() {
        let mut reg = registry();
        assert!(reg.find_cluster("genOnOff").is_none());
        assert!(reg.find_spec("genOnOff", "attrs").is_none());
        assert!(reg.get("genOnOff", "attrs", "onOff").is_none());
        assert!(!reg.set("genOnOff", "attrs", "onOff", 1).unwrap());
        assert!(!reg.has("genOnOff", "attrs", "onOff"));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_set_propagates_validation_error() {
        let mut reg = registry();
        reg.create("genOnOff", "acls").unwrap();
        assert_eq!(
            reg.set("genOnOff", "acls", "onOff", "X").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(reg.set("genOnOff", "acls", "onOff", "rw").unwrap());
        assert!(reg.has(6u32, "acls", 0u32));
    }

    #[test]
    fn test_cluster_list_direction_bits() {
        let mut reg = registry();
        reg.init_json("genBasic", "dir", json!({"value": 1}), true).unwrap();
        reg.init_json("genOnOff", "dir", json!({"value": 3}), true).unwrap();
        reg.init_json("genLevelCtrl", "dir", json!({"value": 2}), true).unwrap();
        reg.init_json("genIdentify", "attrs", json!({"identifyTime": 0}), true)
            .unwrap();
        reg.init_json("myCluster", "dir", json!({"value": 1}), true).unwrap();

        let list = reg.cluster_list();
        assert_eq!(
            list.in_clusters,
            vec![Id::Num(0), Id::Num(6), Id::from("myCluster")]
        );
        assert_eq!(list.out_clusters, vec![Id::Num(6), Id::Num(8)]);
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"in": [0, 6, "myCluster"], "out": [6, 8]})
        );
    }

    #[test]
    fn test_dir_set_updates_cluster_list() {
        let mut reg = registry();
        reg.create("genOnOff", "dir").unwrap();
        assert!(reg.cluster_list().in_clusters.is_empty());
        reg.set("genOnOff", "dir", "value", 3).unwrap();
        let list = reg.cluster_list();
        assert_eq!(list.in_clusters, vec![Id::Num(6)]);
        assert_eq!(list.out_clusters, vec![Id::Num(6)]);
    }

    #[test]
    fn test_negative_direction_sets_both_bits() {
        let mut reg = registry();
        reg.init_json("genOnOff", "dir", json!({"value": -1}), true).unwrap();
        reg.init_json("genLevelCtrl", "dir", json!({"value": -2}), true).unwrap();
        reg.init_json("genBasic", "dir", json!({"value": 1.5}), true).unwrap();

        let list = reg.cluster_list();
        assert_eq!(list.in_clusters, vec![Id::Num(6), Id::Num(0)]);
        assert_eq!(list.out_clusters, vec![Id::Num(6), Id::Num(8)]);
    }

    fn populated() -> Registry {
        let mut reg = registry();
        reg.init_json("genOnOff", "dir", json!({"value": 1}), true).unwrap();
        reg.init_json("genOnOff", "attrs", json!({"onOff": 0}), true).unwrap();
        reg.init_json("genOnOff", "acls", json!({"onOff": "r"}), true).unwrap();
        reg.init_json("genBasic", "attrs", json!({"manufacturerName": "sivann"}), true)
            .unwrap();
        reg
    }

    #[test]
    fn test_dump_sync_scopes() {
        let reg = populated();
        let all = reg.dump_sync(&DumpScope::All).unwrap();
        assert_eq!(
            Value::Object(all),
            json!({
                "genOnOff": {
                    "dir": {"value": 1},
                    "attrs": {"onOff": 0},
                    "acls": {"onOff": "R"}
                },
                "genBasic": {"attrs": {"manufacturerName": "sivann"}}
            })
        );

        let cluster = reg.dump_sync(&DumpScope::Cluster(Id::Num(0))).unwrap();
        assert_eq!(cluster.keys().collect::<Vec<_>>(), vec!["attrs"]);

        let spec = reg
            .dump_sync(&DumpScope::from_path(&["genOnOff", "acls"]).unwrap())
            .unwrap();
        assert_eq!(Value::Object(spec), json!({"onOff": "R"}));

        assert!(reg.dump_sync(&DumpScope::Cluster(Id::from("nope"))).is_none());
    }

    #[test]
    fn test_dump_scope_from_path_arity() {
        assert_eq!(DumpScope::from_path(&[]).unwrap(), DumpScope::All);
        assert_eq!(
            DumpScope::from_path(&["6"]).unwrap(),
            DumpScope::Cluster(Id::Num(6))
        );
        assert_eq!(
            DumpScope::from_path(&["a", "b", "c"]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_dump_matches_registration_order() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut reg = populated();
        let counter = reads.clone();
        reg.set(
            "genBasic",
            "attrs",
            "modelId",
            Callback::new().with_read(read_fn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(json!("lamp")) }
            })),
        )
        .unwrap();

        let first = reg.dump(&DumpScope::All).await.unwrap();
        let second = reg.dump(&DumpScope::All).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["genOnOff", "genBasic"]);
        assert_eq!(first["genBasic"]["attrs"]["modelId"], json!("lamp"));
        assert_eq!(reads.load(Ordering::SeqCst), 2);

        let synced = reg.dump_sync(&DumpScope::All).unwrap();
        assert_eq!(synced["genBasic"]["attrs"]["modelId"], json!({"read": "_read_"}));
    }

    #[tokio::test]
    async fn test_dump_missing_scope_is_not_found() {
        let reg = populated();
        let err = reg
            .dump(&DumpScope::Spec(Id::from("genOnOff"), Sid::Cmds))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_scenario_read_write_attr_without_schema() {
        let mut reg = registry();
        reg.init("myCluster", "attrs", [(16u32, json!(1))], false)
            .unwrap();
        assert_eq!(reg.read("myCluster", 16u32).await.unwrap(), json!(1));
        assert_eq!(
            reg.write("myCluster", 16u32, json!(2)).await.unwrap(),
            json!(2)
        );
        assert_eq!(
            reg.get("myCluster", "attrs", 16u32).and_then(Resource::as_value),
            Some(json!(2))
        );
    }

    #[tokio::test]
    async fn test_read_write_without_attrs_fail_not_found() {
        let mut reg = registry();
        reg.create("genOnOff", "dir").unwrap();
        assert_eq!(
            reg.read("genOnOff", "onOff").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            reg.write("genOnOff", "onOff", json!(1)).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_scenario_exec_command_with_host() {
        let mut reg = registry();
        let handler = exec_fn(|args: ExecArgs| async move {
            let host = args.host_as::<App>().map(|app| app.name).unwrap_or("none");
            let x = args.arg_object()["x"].as_i64().unwrap_or_default();
            Ok(json!({"host": host, "result": x + 1}))
        });
        reg.init("genOnOff", "cmds", [("toggle", Resource::function(handler))], true)
            .unwrap();
        reg.glue(Arc::new(App { name: "zapp" }));

        let out = reg
            .exec(CommandKind::Cmd, "genOnOff", "toggle", json!({"x": 4}))
            .await
            .unwrap();
        assert_eq!(out, json!({"host": "zapp", "result": 5}));

        let plain = exec_fn(|args: ExecArgs| async move {
            Ok(json!(args.arg_object()["x"].as_i64().unwrap_or_default() + 1))
        });
        let mut reg = registry();
        reg.init("genOnOff", "cmds", [(2u32, Resource::function(plain))], true)
            .unwrap();
        let out = reg
            .exec("cmd".parse().unwrap(), 6u32, 2u32, json!({"x": 4}))
            .await
            .unwrap();
        assert_eq!(out, json!(5));
    }

    #[tokio::test]
    async fn test_exec_command_response() {
        let mut reg = registry();
        let handler = exec_fn(|args: ExecArgs| async move {
            let time = args.arg_object()["timeout"].clone();
            Ok(json!({"host": args.host.is_some(), "timeout": time}))
        });
        reg.init(
            "genIdentify",
            "cmdRsps",
            [("identifyQueryRsp", Resource::function(handler))],
            true,
        )
        .unwrap();
        reg.glue(Arc::new(App { name: "zapp" }));

        let out = reg
            .exec(CommandKind::CmdRsp, 3u32, 0u32, json!({"timeout": 30}))
            .await
            .unwrap();
        assert_eq!(out, json!({"host": true, "timeout": 30}));
        assert_eq!(
            reg.exec(CommandKind::Cmd, 3u32, 0u32, json!({}))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_exec_failures() {
        let mut reg = registry();
        reg.init(
            "genIdentify",
            "cmds",
            [("identify", Resource::function(exec_fn(|_| async { Ok(Value::Null) })))],
            true,
        )
        .unwrap();

        assert_eq!(
            reg.exec(CommandKind::Cmd, "genIdentify", "identify", json!([1]))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            reg.exec(CommandKind::CmdRsp, "genIdentify", "identifyQueryRsp", json!({}))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            reg.exec(CommandKind::Cmd, "genIdentify", "identifyQuery", json!({}))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            "bogus".parse::<CommandKind>().unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_exec_args_without_host() {
        let args = ExecArgs::new(None, vec![json!({"x": 1})]);
        assert!(args.host_as::<App>().is_none());
        assert_eq!(args.arg_object()["x"], json!(1));
    }
}
