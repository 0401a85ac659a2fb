use anyhow::Result;
use log::{debug, trace};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use crate::{
    config::BundleOptions, processor::DeclarationProcessor, resolver::normalize,
    storage::StorageGateway, types::DeclarationFile,
};

/// Walks the declaration tree from the entry file.
pub struct TreeExplorer<'a> {
    entry: PathBuf,
    processor: DeclarationProcessor<'a>,
}

impl<'a> TreeExplorer<'a> {
    pub fn new(options: &'a BundleOptions, gateway: &'a dyn StorageGateway) -> Self {
        Self { entry: normalize(&options.entry), processor: DeclarationProcessor::new(options, gateway) }
    }

    /// Processes every file reachable from the entry, each exactly once.
    ///
    /// The result is in pre-order: a file comes before everything reachable
    /// through its imports, and earlier imports (with their subtrees) come
    /// before later ones. A file reached again through a cycle or a second
    /// path keeps the position of its first discovery.
    pub fn explore(&self) -> Result<Vec<DeclarationFile>> {
        let mut visited = HashSet::from([self.entry.clone()]);
        let mut files = Vec::new();
        self.explore_internal(&self.entry, &mut visited, &mut files)?;
        debug!("Explored {} declaration files from {}", files.len(), self.entry.display());
        Ok(files)
    }

    fn explore_internal(
        &self,
        file: &Path,
        visited: &mut HashSet<PathBuf>,
        files: &mut Vec<DeclarationFile>,
    ) -> Result<()> {
        let declaration = self.processor.process(file)?;
        let imports = declaration.imports.clone();
        files.push(declaration);

        for import in imports {
            // Already scheduled, possibly still being processed up the stack
            if !visited.insert(import.clone()) {
                trace!("Already visited: {}", import.display());
                continue;
            }
            self.explore_internal(&import, visited, files)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::BundleError, storage::AssetGateway};
    use pretty_assertions::assert_eq;

    fn explore(files: &[(&str, &str)]) -> Result<Vec<DeclarationFile>> {
        let options = BundleOptions::new("/lib/index.d.ts", "/lib/bundle.d.ts", "mylib");
        let gateway = AssetGateway::new("/lib");
        for (path, text) in files {
            gateway.insert(path, *text);
        }
        TreeExplorer::new(&options, &gateway).explore()
    }

    fn names(files: &[DeclarationFile]) -> Vec<&str> {
        files.iter().map(|f| f.module_name.as_str()).collect()
    }

    #[test]
    fn test_single_file() {
        let files = explore(&[("index.d.ts", "export type A = 1;\n")]).unwrap();
        assert_eq!(names(&files), vec!["mylib"]);
    }

    #[test]
    fn test_pre_order() {
        let files = explore(&[
            ("index.d.ts", "export * from './a';\nexport * from './b';\n"),
            ("a.d.ts", "export * from './a1';\nexport * from './a2';\n"),
            ("a1.d.ts", ""),
            ("a2.d.ts", ""),
            ("b.d.ts", "export * from './b1';\n"),
            ("b1.d.ts", ""),
        ])
        .unwrap();

        assert_eq!(
            names(&files),
            vec!["mylib", "mylib/a", "mylib/a1", "mylib/a2", "mylib/b", "mylib/b1"]
        );
    }

    #[test]
    fn test_two_file_cycle() {
        let files = explore(&[
            ("index.d.ts", "export * from './b';\n"),
            ("b.d.ts", "export * from './index';\n"),
        ])
        .unwrap();

        assert_eq!(names(&files), vec!["mylib", "mylib/b"]);
    }

    #[test]
    fn test_longer_cycle_and_self_import() {
        let files = explore(&[
            ("index.d.ts", "export * from './a';\n"),
            ("a.d.ts", "export * from './a';\nexport * from './b';\n"),
            ("b.d.ts", "export * from './c';\n"),
            ("c.d.ts", "export * from './a';\nexport * from './index';\n"),
        ])
        .unwrap();

        assert_eq!(names(&files), vec!["mylib", "mylib/a", "mylib/b", "mylib/c"]);
    }

    #[test]
    fn test_diamond_keeps_first_discovery() {
        let files = explore(&[
            ("index.d.ts", "export * from './a';\nexport * from './b';\n"),
            ("a.d.ts", "export * from './shared';\n"),
            ("b.d.ts", "export * from './shared';\n"),
            ("shared.d.ts", ""),
        ])
        .unwrap();

        assert_eq!(names(&files), vec!["mylib", "mylib/a", "mylib/shared", "mylib/b"]);
    }

    #[test]
    fn test_same_file_through_different_specifiers() {
        let files = explore(&[
            ("index.d.ts", "export * from './sub';\nexport * from './sub/index';\n"),
            ("sub/index.d.ts", "export * from '../sub/./index';\n"),
        ])
        .unwrap();

        assert_eq!(names(&files), vec!["mylib", "mylib/sub/index"]);
    }

    #[test]
    fn test_error_in_nested_file_propagates() {
        let err = explore(&[
            ("index.d.ts", "export * from './a';\n"),
            ("a.d.ts", "export * from './gone.d.ts';\n"),
        ])
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::FileNotFound { .. })
        ));
    }
}
