//! Shared test utilities for the CLI E2E tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.

use std::env;
use std::path::PathBuf;

use assert_fs::prelude::*;
use assert_fs::TempDir;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    pub use super::CacheFixture;
}

/// Check if network tests should be skipped.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A temporary directory holding a cache root and, optionally, a config file.
pub struct CacheFixture {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl CacheFixture {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn cache_root(&self) -> PathBuf {
        self.temp.child("cache").path().to_path_buf()
    }

    /// Write `yaml` as `repo-mirror.yaml` and return its path.
    pub fn with_config(&self, yaml: &str) -> PathBuf {
        let config = self.temp.child("repo-mirror.yaml");
        config.write_str(yaml).unwrap();
        config.path().to_path_buf()
    }

    /// Create a directory (and parents) below the cache root.
    pub fn create_in_cache(&self, relative: &str) -> PathBuf {
        let dir = self.temp.child("cache").child(relative);
        dir.create_dir_all().unwrap();
        dir.path().to_path_buf()
    }
}
