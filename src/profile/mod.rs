//! Device profiles: data-only cluster definitions loaded from YAML or JSON.
//!
//! A profile lists the clusters of a device and the groups to initialize
//! in each, in file order:
//!
//! ```yaml
//! name: dimmable-lamp
//! validate: true
//! clusters:
//!   genOnOff:
//!     dir: { value: 1 }
//!     attrs: { onOff: 0 }
//!     acls: { onOff: RW }
//! ```
//!
//! Handlers cannot be expressed in a file; callback and command resources
//! are registered in code after the profile is applied.

pub mod loader;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::registry::Registry;
use crate::types::ident::Id;

pub use loader::ProfileLoader;

fn default_true() -> bool {
    true
}

/// A device profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Optional profile name, used in log output.
    #[serde(default)]
    pub name: Option<String>,
    /// Check ids against the directory schema when initializing.
    #[serde(default = "default_true")]
    pub validate: bool,
    /// Cluster id → group kind → resources.
    #[serde(default)]
    pub clusters: IndexMap<String, IndexMap<String, Value>>,
}

impl DeviceProfile {
    /// Parse a profile from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a profile from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from disk; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().map_or(false, |ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Profile name, or `<unnamed>` when none is set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Initialize every listed group in `registry`, replacing existing
    /// resources of those groups. Stops at the first failing group.
    pub fn apply(&self, registry: &mut Registry) -> Result<()> {
        for (cid, groups) in &self.clusters {
            for (sid, resources) in groups {
                registry.init_json(Id::parse(cid), sid.as_str(), resources.clone(), self.validate)?;
            }
        }
        log::debug!(
            "Applied profile {} ({} clusters)",
            self.display_name(),
            self.clusters.len()
        );
        Ok(())
    }

    /// Build a fresh registry from this profile.
    pub fn build(&self, mut registry: Registry) -> Result<Registry> {
        self.apply(&mut registry)?;
        Ok(registry)
    }
}
