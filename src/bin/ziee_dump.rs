//! Build a registry from a device profile and print its dumps.
//!
//! # Environment Variables
//!
//! - `ZIEE_PROFILE`: profile file (YAML or JSON), or a directory of them (required)
//! - `ZIEE_DIRECTORY`: extra directory table merged over the built-in one (optional)
//! - `ZIEE_READ`: set to `1` to also run the asynchronous dump
//! - `RUST_LOG`: log filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! ZIEE_PROFILE=profiles/lamp.yaml cargo run --bin ziee-dump
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use ziee::{DeviceProfile, Directory, DumpScope, ProfileLoader, Registry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let profile_path = std::env::var("ZIEE_PROFILE").context("ZIEE_PROFILE is not set")?;

    let mut directory = Directory::builtin();
    if let Ok(extra) = std::env::var("ZIEE_DIRECTORY") {
        let table = Directory::from_file(&extra)
            .with_context(|| format!("loading directory table {}", extra))?;
        log::info!("Merged {} clusters from {}", table.len(), extra);
        directory.merge(table);
    }

    let profiles: Vec<DeviceProfile> = if Path::new(&profile_path).is_dir() {
        ProfileLoader::with_search_path(&profile_path)
            .load_all()?
            .into_iter()
            .map(|(_, p)| p)
            .collect()
    } else {
        vec![DeviceProfile::from_file(&profile_path)
            .with_context(|| format!("loading profile {}", profile_path))?]
    };

    let directory = Arc::new(directory);
    let read_all = std::env::var("ZIEE_READ").as_deref() == Ok("1");

    for profile in profiles {
        let registry = profile
            .build(Registry::new(directory.clone()))
            .with_context(|| format!("applying profile {}", profile.display_name()))?;
        log::info!(
            "Profile {}: {} clusters",
            profile.display_name(),
            registry.len()
        );

        let mut report = json!({
            "name": profile.display_name(),
            "clusterList": registry.cluster_list(),
            "dumpSync": registry.dump_sync(&DumpScope::All),
        });
        if read_all {
            report["dump"] = serde_json::Value::Object(registry.dump(&DumpScope::All).await?);
        }

        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
