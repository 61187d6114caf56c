#![allow(dead_code)]

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A complete, valid 14-layer model. Individual layers can be swapped out
/// before the fixture is written.
pub struct ModelFixture {
    layers: BTreeMap<String, String>,
}

impl Default for ModelFixture {
    fn default() -> Self {
        let mut layers = BTreeMap::new();
        for (stem, body) in BASE_LAYERS {
            layers.insert(format!("{stem}.yaml"), body.to_string());
        }
        Self { layers }
    }
}

impl ModelFixture {
    /// Replace one layer's YAML body.
    pub fn with_layer(mut self, stem: &str, body: &str) -> Self {
        self.layers.insert(format!("{stem}.yaml"), body.to_string());
        self
    }

    /// Drop a layer entirely.
    pub fn without_layer(mut self, stem: &str) -> Self {
        self.layers.remove(&format!("{stem}.yaml"));
        self
    }

    /// Store a layer under an explicit file name (e.g. `domains.json`).
    pub fn with_file(mut self, stem: &str, file_name: &str, body: &str) -> Self {
        self.layers.remove(&format!("{stem}.yaml"));
        self.layers.insert(file_name.to_string(), body.to_string());
        self
    }

    /// Write the layers to `<tmp>/model/` and return the workspace.
    pub fn write(&self) -> Result<Workspace> {
        let dir = TempDir::new().context("failed to allocate fixture dir")?;
        let source = dir.path().join("model");
        fs::create_dir_all(&source)?;
        for (file_name, body) in &self.layers {
            fs::write(source.join(file_name), body)
                .with_context(|| format!("failed to write fixture layer {file_name}"))?;
        }
        Ok(Workspace { dir })
    }
}

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn source_dir(&self) -> PathBuf {
        self.dir.path().join("model")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("build").join("model")
    }

    pub fn artifact(&self, relative: &str) -> PathBuf {
        self.output_dir().join(relative)
    }

    pub fn read_artifact(&self, relative: &str) -> Result<String> {
        let path = self.artifact(relative);
        fs::read_to_string(&path).with_context(|| format!("missing artifact {}", path.display()))
    }

    pub fn config(&self) -> product_model::CompileConfig {
        product_model::CompileConfig {
            source_dir: self.source_dir(),
            output_dir: self.output_dir(),
            check_only: false,
        }
    }

    /// Run the built binary from the workspace root with no arguments.
    /// Every row of a CSV artifact, header included.
    pub fn read_csv(&self, relative: &str) -> Result<Vec<Vec<String>>> {
        let text = self.read_artifact(relative)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes());
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("malformed row in {relative}"))?;
            rows.push(record.iter().map(String::from).collect());
        }
        Ok(rows)
    }

    pub fn run_binary(&self, args: &[&str]) -> Result<Output> {
        Command::new(env!("CARGO_BIN_EXE_compile-model"))
            .args(args)
            .current_dir(self.root())
            .env_remove("PRODUCT_MODEL_ROOT")
            .env_remove("PRODUCT_MODEL_SRC")
            .env_remove("PRODUCT_MODEL_OUT")
            .env("RUST_LOG", "info")
            .output()
            .context("failed to run compile-model")
    }
}
