use anyhow::{Context, Result};
use dashmap::DashMap;
use log::{debug, trace};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::BundleError,
    resolver::{normalize, to_posix},
};

/// File access used by the bundler. All paths are absolute.
pub trait StorageGateway {
    /// Read a whole file as text; fails if it is missing or unreadable
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Whether a file exists. Never fails: anything unreachable is `false`
    fn exists(&self, path: &Path) -> bool;

    /// Create or overwrite a file
    fn write_text(&self, path: &Path, text: &str) -> Result<()>;
}

/// Reads and writes through the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsGateway;

impl StorageGateway for FsGateway {
    fn read_text(&self, path: &Path) -> Result<String> {
        trace!("Reading file: {}", path.display());
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        debug!("Writing {} bytes to {}", text.len(), path.display());
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// In-memory asset map, as a compiler plugin sees the files it emitted.
///
/// Assets are keyed by their path relative to `root`, with forward slashes.
/// In watch mode a compiler only surfaces the assets that changed since the
/// previous build, so callers `absorb` each build's assets into the same
/// gateway and the accumulated map always holds a complete tree.
#[derive(Debug)]
pub struct AssetGateway {
    root: PathBuf,
    assets: DashMap<String, String>,
}

impl AssetGateway {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: normalize(root.as_ref()), assets: DashMap::new() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn insert(&self, relative: &str, text: impl Into<String>) {
        self.assets.insert(asset_key(relative), text.into());
    }

    pub fn get(&self, relative: &str) -> Option<String> {
        self.assets.get(&asset_key(relative)).map(|v| v.value().clone())
    }

    /// Merge a newer set of assets over the accumulated ones.
    /// Returns how many assets were taken in.
    pub fn absorb<I, K, V>(&self, assets: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut count = 0;
        for (relative, text) in assets {
            self.insert(relative.as_ref(), text);
            count += 1;
        }
        debug!("Absorbed {} assets ({} total)", count, self.assets.len());
        count
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn key_for(&self, path: &Path) -> Result<String, BundleError> {
        let path = normalize(path);
        path.strip_prefix(&self.root).map(to_posix).map_err(|_| BundleError::OutsideAssetRoot {
            path: path.clone(),
            root: self.root.clone(),
        })
    }
}

fn asset_key(relative: &str) -> String {
    to_posix(&normalize(Path::new(&relative.replace('\\', "/"))))
        .trim_start_matches('/')
        .to_string()
}

impl StorageGateway for AssetGateway {
    fn read_text(&self, path: &Path) -> Result<String> {
        let key = self.key_for(path)?;
        trace!("Reading asset: {}", key);
        self.assets
            .get(&key)
            .map(|v| v.value().clone())
            .ok_or_else(|| BundleError::AssetNotFound(path.to_path_buf()).into())
    }

    fn exists(&self, path: &Path) -> bool {
        self.key_for(path).is_ok_and(|key| self.assets.contains_key(&key))
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        let key = self.key_for(path)?;
        debug!("Emitting asset {} ({} bytes)", key, text.len());
        self.assets.insert(key, text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_gateway_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/out.d.ts");
        let gateway = FsGateway;

        assert!(!gateway.exists(&path));
        gateway.write_text(&path, "export {};").unwrap();
        assert!(gateway.exists(&path));
        assert_eq!(gateway.read_text(&path).unwrap(), "export {};");

        gateway.write_text(&path, "overwritten").unwrap();
        assert_eq!(gateway.read_text(&path).unwrap(), "overwritten");
    }

    #[test]
    fn test_fs_gateway_directory_is_not_a_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!FsGateway.exists(temp_dir.path()));
    }

    #[test]
    fn test_fs_gateway_read_missing_fails_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.d.ts");
        let err = FsGateway.read_text(&path).unwrap_err();
        assert!(err.to_string().contains("missing.d.ts"));
    }

    #[test]
    fn test_asset_gateway_paths_are_relative_to_root() {
        let gateway = AssetGateway::new("/project/dist");
        gateway.insert("types/index.d.ts", "export {};");

        assert!(gateway.exists(Path::new("/project/dist/types/index.d.ts")));
        assert!(gateway.exists(Path::new("/project/dist/types/./sub/../index.d.ts")));
        assert!(!gateway.exists(Path::new("/project/dist/types/other.d.ts")));
        assert_eq!(
            gateway.read_text(Path::new("/project/dist/types/index.d.ts")).unwrap(),
            "export {};"
        );
    }

    #[test]
    fn test_asset_gateway_normalizes_keys() {
        let gateway = AssetGateway::new("/out");
        gateway.insert("types\\a.d.ts", "a");
        gateway.insert("./types/b.d.ts", "b");

        assert_eq!(gateway.get("types/a.d.ts").as_deref(), Some("a"));
        assert_eq!(gateway.get("types/b.d.ts").as_deref(), Some("b"));
    }

    #[test]
    fn test_asset_gateway_missing_asset() {
        let gateway = AssetGateway::new("/out");
        let err = gateway.read_text(Path::new("/out/nope.d.ts")).unwrap_err();
        assert!(matches!(err.downcast_ref::<BundleError>(), Some(BundleError::AssetNotFound(_))));
    }

    #[test]
    fn test_asset_gateway_outside_root() {
        let gateway = AssetGateway::new("/out");
        gateway.insert("a.d.ts", "a");

        assert!(!gateway.exists(Path::new("/elsewhere/a.d.ts")));
        let err = gateway.write_text(Path::new("/elsewhere/bundle.d.ts"), "x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::OutsideAssetRoot { .. })
        ));
    }

    #[test]
    fn test_asset_gateway_write_emits_asset() {
        let gateway = AssetGateway::new("/out");
        gateway.write_text(Path::new("/out/bundle/index.d.ts"), "merged").unwrap();
        assert_eq!(gateway.get("bundle/index.d.ts").as_deref(), Some("merged"));
    }

    #[test]
    fn test_asset_gateway_absorb_keeps_previous_assets() {
        let gateway = AssetGateway::new("/out");
        gateway.absorb([("index.d.ts", "v1"), ("a.d.ts", "a1")]);

        // Second watch build only surfaces the changed asset
        let absorbed = gateway.absorb([("a.d.ts", "a2")]);

        assert_eq!(absorbed, 1);
        assert_eq!(gateway.len(), 2);
        assert_eq!(gateway.get("index.d.ts").as_deref(), Some("v1"));
        assert_eq!(gateway.get("a.d.ts").as_deref(), Some("a2"));
    }
}
