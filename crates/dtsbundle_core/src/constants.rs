//! Naming conventions of compiler-emitted declaration files.

/// Suffix identifying a declaration file
pub const DTS_SUFFIX: &str = ".d.ts";

/// File stem tried when a specifier points at a directory
pub const INDEX_STEM: &str = "index";

/// Indentation applied inside each `declare module` block unless configured
pub const DEFAULT_INDENT: &str = "\t";

/// Keyword stripped from file contents before wrapping, since nested
/// `declare` is not allowed inside an ambient module block
pub(crate) const DECLARE_KEYWORD: &str = "declare ";
