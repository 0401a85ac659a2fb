use anyhow::Result;
use log::{debug, info};

use crate::{
    config::BundleOptions,
    explorer::TreeExplorer,
    storage::StorageGateway,
    types::BundleResult,
};

/// Explores the declaration tree and writes every module block to the
/// configured output in one go.
pub struct Bundler<'a> {
    options: &'a BundleOptions,
    gateway: &'a dyn StorageGateway,
}

impl<'a> Bundler<'a> {
    pub fn new(options: &'a BundleOptions, gateway: &'a dyn StorageGateway) -> Self {
        Self { options, gateway }
    }

    /// All or nothing: the output is only written once every file has been
    /// processed successfully.
    pub fn bundle(&self) -> Result<BundleResult> {
        info!(
            "Bundling declarations from {} as '{}'",
            self.options.entry.display(),
            self.options.library_name
        );

        let files = TreeExplorer::new(self.options, self.gateway).explore()?;

        // Each block already ends with its own line break
        let content: String = files.iter().map(|f| f.content.as_str()).collect();
        debug!("Merged {} blocks into {} bytes", files.len(), content.len());

        self.gateway.write_text(&self.options.output, &content)?;
        info!("Wrote {} modules to {}", files.len(), self.options.output.display());

        Ok(BundleResult {
            output: self.options.output.clone(),
            files_bundled: files.len(),
            modules: files.into_iter().map(|f| f.module_name).collect(),
        })
    }
}
