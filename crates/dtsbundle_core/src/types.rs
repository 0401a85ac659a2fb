use std::path::PathBuf;

/// A processed declaration file, ready to be emitted as one module block.
#[derive(Debug, Clone)]
pub struct DeclarationFile {
    /// Normalized absolute path of the source `.d.ts`
    pub absolute_path: PathBuf,
    /// Path relative to the entry directory, forward slashes, leading `/`,
    /// suffix stripped (e.g. `/utils/strings`)
    pub module_relative_path: String,
    /// Name of the `declare module` block this file is wrapped in
    pub module_name: String,
    /// Rewritten, declare-stripped, indented and wrapped text
    pub content: String,
    /// Absolute paths of resolved relative imports, in source order
    pub imports: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BundleResult {
    pub output: PathBuf,
    pub files_bundled: usize,
    /// Module names in emission order
    pub modules: Vec<String>,
}
