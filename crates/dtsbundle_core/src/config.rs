use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    constants::{DEFAULT_INDENT, DTS_SUFFIX},
    error::BundleError,
    resolver::normalize,
};

#[derive(Debug, Clone, Parser, Deserialize)]
#[command(name = "bundle")]
#[command(about = "Merge compiler-emitted declaration files into a single .d.ts")]
#[serde(rename_all = "camelCase")]
pub struct BundleOptions {
    /// Root declaration file written by the compiler (e.g. dist/index.d.ts)
    #[arg(long)]
    pub entry: PathBuf,

    /// Destination of the merged declaration file
    #[arg(long)]
    pub output: PathBuf,

    /// Library name as published in package.json, prefixed to every module name
    #[arg(long)]
    pub library_name: String,

    /// Indentation used inside each `declare module` block
    #[arg(long, default_value = DEFAULT_INDENT)]
    #[serde(default = "default_indent")]
    pub indent: String,
}

fn default_indent() -> String {
    DEFAULT_INDENT.to_string()
}

impl BundleOptions {
    pub fn new(
        entry: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        library_name: impl Into<String>,
    ) -> Self {
        Self {
            entry: entry.into(),
            output: output.into(),
            library_name: library_name.into(),
            indent: default_indent(),
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Load options from a JSON file using the `entry`, `output`,
    /// `libraryName` and `indent` keys
    pub fn from_json_file(path: &Path) -> Result<Self> {
        debug!("Reading bundle options from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let options: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse options file {}", path.display()))?;
        Ok(options)
    }

    /// Make entry and output absolute, apply the indent default and validate
    pub fn initialize(&mut self) -> Result<()> {
        let cwd = env::current_dir().context("Failed to read current directory")?;
        self.entry = absolutize(&cwd, &self.entry);
        self.output = absolutize(&cwd, &self.output);
        info!("Using entry: {}", self.entry.display());
        debug!("Using output: {}", self.output.display());

        if self.library_name.trim().is_empty() {
            return Err(BundleError::InvalidOptions("library name must not be empty".into()).into());
        }

        let entry_name = self.entry.file_name().map(|n| n.to_string_lossy().to_string());
        if !entry_name.as_deref().is_some_and(|n| n.ends_with(DTS_SUFFIX)) {
            return Err(BundleError::InvalidOptions(format!(
                "entry {} is not a {} file",
                self.entry.display(),
                DTS_SUFFIX
            ))
            .into());
        }

        if self.indent.is_empty() {
            self.indent = default_indent();
        }
        Ok(())
    }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() { normalize(path) } else { normalize(&cwd.join(path)) }
}
