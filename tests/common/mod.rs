//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Path of a bundled demo config, e.g. `demo_config("max")`
pub fn demo_config(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
        .join("reco.yml")
}

/// Temporary working directory pre-populated with files
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Workspace holding a copy of a bundled demo config as `reco.yml`
    pub fn with_demo(name: &str) -> Result<Self> {
        let workspace = Self::new()?;
        fs::copy(demo_config(name), workspace.path().join("reco.yml"))?;
        Ok(workspace)
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.temp_dir.path().join(relative))?)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
