use std::path::PathBuf;

use thiserror::Error;

/// Conditions callers may want to distinguish from plain I/O failures.
///
/// These travel inside `anyhow::Error`; use `downcast_ref::<BundleError>()`
/// to inspect them.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A specifier naming a `.d.ts` file explicitly could not be resolved
    #[error("File not found: {specifier} (imported from {})", importer.display())]
    FileNotFound { specifier: String, importer: PathBuf },

    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    #[error("Path {} is outside the asset root {}", path.display(), root.display())]
    OutsideAssetRoot { path: PathBuf, root: PathBuf },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}
