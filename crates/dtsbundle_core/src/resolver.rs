use log::trace;
use path_clean::clean;
use std::path::{Component, Path, PathBuf};

use crate::{
    constants::{DTS_SUFFIX, INDEX_STEM},
    storage::StorageGateway,
};

/// Lexically clean a path (`.` and `..` folded, no filesystem access)
pub(crate) fn normalize(path: &Path) -> PathBuf {
    clean(path)
}

/// Join path components with `/`, whatever the host separator
pub(crate) fn to_posix(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(p) => parts.push(p.to_string_lossy().to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}

/// Resolve a relative specifier written in `importer` to an existing
/// declaration file.
///
/// Candidates, in order:
/// 1. the specifier itself, when it already names a `.d.ts` file
/// 2. `<specifier>.d.ts`
/// 3. `<specifier>/index.d.ts`
pub(crate) fn resolve_specifier(
    gateway: &dyn StorageGateway,
    importer: &Path,
    specifier: &str,
) -> Option<PathBuf> {
    let dir = importer.parent().unwrap_or_else(|| Path::new("/"));

    let mut candidates = Vec::with_capacity(3);
    if specifier.ends_with(DTS_SUFFIX) {
        candidates.push(dir.join(specifier));
    }
    candidates.push(dir.join(format!("{specifier}{DTS_SUFFIX}")));
    candidates.push(dir.join(specifier).join(format!("{INDEX_STEM}{DTS_SUFFIX}")));

    for candidate in candidates {
        let candidate = normalize(&candidate);
        trace!("Probing {} for '{}'", candidate.display(), specifier);
        if gateway.exists(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Path of `file` relative to `base_dir`, with a leading `/`, forward
/// slashes and the declaration suffix stripped: `/utils/strings`.
///
/// Files outside `base_dir` keep their `..` segments.
pub(crate) fn module_relative_path(base_dir: &Path, file: &Path) -> String {
    let relative = make_relative(file, base_dir).unwrap_or_else(|| file.to_path_buf());
    let posix = format!("/{}", to_posix(&relative));
    match posix.strip_suffix(DTS_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => posix,
    }
}

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_components = target.components();
    let mut base_components = base.components();

    let mut common_prefix_len = 0;
    let mut target_parts = Vec::new();
    let mut base_parts = Vec::new();

    // Find common prefix
    loop {
        match (target_components.next(), base_components.next()) {
            (Some(t), Some(b)) if t == b => {
                common_prefix_len += 1;
            }
            (Some(t), Some(b)) => {
                target_parts.push(t);
                base_parts.push(b);
                break;
            }
            (Some(t), None) => {
                target_parts.push(t);
                break;
            }
            (None, Some(b)) => {
                base_parts.push(b);
                break;
            }
            (None, None) => break,
        }
    }

    target_parts.extend(target_components);
    base_parts.extend(base_components);

    // Different roots (e.g. two Windows drives) cannot be related
    if common_prefix_len == 0 && target.components().next() != base.components().next() {
        return None;
    }

    let mut result = PathBuf::new();
    for _ in &base_parts {
        result.push("..");
    }
    for component in target_parts {
        match component {
            Component::Normal(p) => result.push(p),
            Component::ParentDir => result.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    Some(result)
}
