//! Shared fixtures for query tests
//!
//! Tests stand in for the Claude CLI with small shell scripts. Scripts are
//! run through `/bin/sh` as the runtime, so they never need the executable
//! bit.

#![allow(dead_code)]

use claude_code_sdk::QueryOptions;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A shell script posing as the Claude CLI
pub struct FakeCli {
    dir: TempDir,
    path: PathBuf,
}

impl FakeCli {
    /// Write a script with the given body
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("cli.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake cli");
        Self { dir, path }
    }

    /// Write the script under the current directory, so it has a relative path
    pub fn in_current_dir(body: &str) -> Self {
        let dir = tempfile::tempdir_in(".").expect("create temp dir");
        let path = Path::new(".")
            .join(dir.path().file_name().expect("temp dir name"))
            .join("cli.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake cli");
        Self { dir, path }
    }

    /// Path to the script
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scratch directory next to the script
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Options that run this script through `/bin/sh`
    pub fn options(&self) -> QueryOptions {
        QueryOptions::new()
            .with_executable("/bin/sh")
            .with_cli_path(&self.path)
    }
}
