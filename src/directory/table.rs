//! Table-driven directory loaded from YAML or JSON.
//!
//! ```yaml
//! clusters:
//!   genOnOff:
//!     id: 6
//!     attrs: { onOff: 0 }
//!     cmds: { "off": 0, "on": 1, toggle: 2 }
//! ```

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{DirectoryEntry, KeyResolver};
use crate::error::Result;
use crate::types::ident::Id;

static BUILTIN: Lazy<Directory> = Lazy::new(|| {
    Directory::from_yaml(include_str!("zcl.yaml")).unwrap_or_else(|e| {
        log::error!("Embedded cluster directory is malformed: {}", e);
        Directory::default()
    })
});

/// Name→number tables for one cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterTable {
    pub id: u32,
    #[serde(default)]
    pub attrs: IndexMap<String, u32>,
    #[serde(default)]
    pub cmds: IndexMap<String, u32>,
    #[serde(default, rename = "cmdRsps")]
    pub cmd_rsps: IndexMap<String, u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DirectoryDef {
    #[serde(default)]
    clusters: IndexMap<String, ClusterTable>,
}

/// Directory backed by in-memory cluster tables.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    clusters: IndexMap<String, ClusterTable>,
    /// Numeric cluster id → cluster key
    by_num: HashMap<u32, String>,
}

impl Directory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded ZCL subset (general, measurement clusters).
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Parse a directory from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let def: DirectoryDef = serde_yaml::from_str(yaml)?;
        Ok(Self::from_tables(def.clusters))
    }

    /// Parse a directory from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let def: DirectoryDef = serde_json::from_str(json)?;
        Ok(Self::from_tables(def.clusters))
    }

    /// Load a table file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().map_or(false, |ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Build a directory from cluster tables keyed by canonical cluster key.
    pub fn from_tables(clusters: IndexMap<String, ClusterTable>) -> Self {
        let mut dir = Self::new();
        for (key, table) in clusters {
            dir.add_cluster(key, table);
        }
        dir
    }

    /// Add or replace a cluster table.
    pub fn add_cluster(&mut self, key: impl Into<String>, table: ClusterTable) -> &mut Self {
        let key = key.into();
        if let Some(old) = self.clusters.get(&key) {
            // another cluster may have claimed the old number since
            if self.by_num.get(&old.id) == Some(&key) {
                self.by_num.remove(&old.id);
            }
        }
        self.by_num.insert(table.id, key.clone());
        self.clusters.insert(key, table);
        self
    }

    /// Merge another directory's clusters over this one.
    pub fn merge(&mut self, other: Directory) -> &mut Self {
        for (key, table) in other.clusters {
            self.add_cluster(key, table);
        }
        self
    }

    /// Number of clusters known to the directory.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the directory knows no cluster at all.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    fn table(&self, cid: &str) -> Option<&ClusterTable> {
        match self.clusters.get(cid) {
            Some(t) => Some(t),
            // the caller may pass a numeric key when the cluster itself was unknown at create time
            None => cid
                .parse::<u32>()
                .ok()
                .and_then(|n| self.by_num.get(&n))
                .and_then(|k| self.clusters.get(k)),
        }
    }
}

/// Find `id` in a name→number table, by name or by number.
fn lookup(table: &IndexMap<String, u32>, id: &Id) -> Option<DirectoryEntry> {
    let by_num = |n: u32| {
        table
            .iter()
            .find(|(_, v)| **v == n)
            .map(|(k, v)| DirectoryEntry::new(k.clone(), *v))
    };

    match id {
        Id::Num(n) => by_num(*n),
        Id::Key(k) => match table.get(k) {
            Some(v) => Some(DirectoryEntry::new(k.clone(), *v)),
            None => k.parse::<u32>().ok().and_then(by_num),
        },
    }
}

impl KeyResolver for Directory {
    fn cluster(&self, cid: &Id) -> Option<DirectoryEntry> {
        let num = match cid {
            Id::Num(n) => Some(*n),
            Id::Key(k) => {
                if let Some(t) = self.clusters.get(k) {
                    return Some(DirectoryEntry::new(k.clone(), t.id));
                }
                k.parse::<u32>().ok()
            }
        }?;
        self.by_num
            .get(&num)
            .map(|k| DirectoryEntry::new(k.clone(), num))
    }

    fn attr(&self, cid: &str, aid: &Id) -> Option<DirectoryEntry> {
        self.table(cid).and_then(|t| lookup(&t.attrs, aid))
    }

    fn command(&self, cid: &str, cmd: &Id) -> Option<DirectoryEntry> {
        self.table(cid).and_then(|t| lookup(&t.cmds, cmd))
    }

    fn command_response(&self, cid: &str, cmd: &Id) -> Option<DirectoryEntry> {
        self.table(cid).and_then(|t| lookup(&t.cmd_rsps, cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_resolves_clusters() {
        let dir = Directory::builtin();
        assert!(!dir.is_empty());
        assert_eq!(dir.cluster_key(&Id::Num(6)), "genOnOff");
        assert_eq!(dir.cluster_key(&Id::from("genOnOff")), "genOnOff");
        assert_eq!(dir.cluster_key(&Id::from("1026")), "msTemperatureMeasurement");
        assert_eq!(dir.cluster_num(&Id::from("genLevelCtrl")), Id::Num(8));
    }

    #[test]
    fn test_builtin_resolves_attrs_and_commands() {
        let dir = Directory::builtin();
        assert_eq!(dir.attr_key("genOnOff", &Id::Num(0)), "onOff");
        assert_eq!(dir.attr_key("genBasic", &Id::Num(16)), "locationDesc");
        assert_eq!(dir.command_key("genOnOff", &Id::Num(2)), "toggle");
        assert_eq!(dir.command_key("genOnOff", &Id::from("on")), "on");
        assert_eq!(
            dir.command_response_key("genIdentify", &Id::Num(0)),
            "identifyQueryRsp"
        );
        assert!(dir.is_attr("genOnOff", &Id::from("onOff")));
        assert!(!dir.is_attr("genOnOff", &Id::from("currentLevel")));
        assert!(dir.is_command_response("genGroups", &Id::from("viewRsp")));
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let dir = Directory::builtin();
        assert_eq!(dir.cluster_key(&Id::from("myCluster")), "myCluster");
        assert_eq!(dir.cluster_num(&Id::from("myCluster")), Id::from("myCluster"));
        assert_eq!(dir.attr_key("genOnOff", &Id::Num(999)), "999");
        assert_eq!(dir.attr_key("myCluster", &Id::from("foo")), "foo");
    }

    #[test]
    fn test_from_json_and_merge() {
        let json = r#"{"clusters": {"mfrCustom": {"id": 64512, "attrs": {"mode": 1}}}}"#;
        let extra = Directory::from_json(json).unwrap();
        let mut dir = Directory::builtin();
        let before = dir.len();
        dir.merge(extra);
        assert_eq!(dir.len(), before + 1);
        assert_eq!(dir.cluster_key(&Id::Num(64512)), "mfrCustom");
        assert_eq!(dir.attr_key("mfrCustom", &Id::Num(1)), "mode");
    }

    #[test]
    fn test_replacing_cluster_updates_numeric_index() {
        let mut dir = Directory::new();
        dir.add_cluster("a", ClusterTable { id: 1, ..Default::default() });
        dir.add_cluster("a", ClusterTable { id: 2, ..Default::default() });
        assert_eq!(dir.cluster_key(&Id::Num(1)), "1");
        assert_eq!(dir.cluster_key(&Id::Num(2)), "a");
    }

    #[test]
    fn test_replacing_cluster_keeps_number_claimed_by_another() {
        let mut dir = Directory::new();
        dir.add_cluster("a", ClusterTable { id: 1, ..Default::default() });
        dir.add_cluster("b", ClusterTable { id: 1, ..Default::default() });
        dir.add_cluster("a", ClusterTable { id: 2, ..Default::default() });
        assert_eq!(dir.cluster_key(&Id::Num(1)), "b");
        assert!(dir.is_cluster(&Id::Num(1)));
        assert_eq!(dir.cluster_key(&Id::Num(2)), "a");
    }

    #[test]
    fn test_from_file_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.yaml");
        std::fs::write(&path, "clusters:\n  lightingColorCtrl:\n    id: 768\n").unwrap();
        let loaded = Directory::from_file(&path).unwrap();
        assert!(loaded.is_cluster(&Id::Num(768)));
    }
}
