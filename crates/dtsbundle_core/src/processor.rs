use anyhow::Result;
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::{
    config::BundleOptions,
    constants::{DECLARE_KEYWORD, DTS_SUFFIX},
    error::BundleError,
    resolver::{module_relative_path, normalize, resolve_specifier},
    scanner::is_in_string_or_comment,
    storage::StorageGateway,
    types::DeclarationFile,
};

/// An `import`/`export` sentence whose source is a relative path.
///
/// Accepted clauses: `{ a, b as c }`, `Default`, `Default, { a }`,
/// `* as ns`, `*`, each optionally preceded by `type`, or no clause at all
/// (`import "./side-effect"`). The specifier is captured in group 1 (double
/// quotes) or group 2 (single quotes). A trailing `;` and one line break
/// belong to the sentence.
static SPECIFIER_SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(?:import|export)\s+",
        r"(?:(?:type\s+)?",
        r"(?:\{[\w$,\s]*\}|\*(?:\s+as\s+[\w$]+)?|[\w$]+(?:\s*,\s*(?:\{[\w$,\s]*\}|\*\s+as\s+[\w$]+))?)",
        r"\s*from\s*)?",
        r#"(?:"(\.[^"\n]*)"|'(\.[^'\n]*)')"#,
        r";?(?:\r?\n)?",
    ))
    .expect("specifier sentence pattern is valid")
});

/// Turns one declaration file into a self-contained `declare module` block.
pub struct DeclarationProcessor<'a> {
    gateway: &'a dyn StorageGateway,
    entry: PathBuf,
    base_dir: PathBuf,
    library_name: &'a str,
    indent: &'a str,
}

impl<'a> DeclarationProcessor<'a> {
    pub fn new(options: &'a BundleOptions, gateway: &'a dyn StorageGateway) -> Self {
        let entry = normalize(&options.entry);
        let base_dir = entry.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"));
        Self {
            gateway,
            entry,
            base_dir,
            library_name: &options.library_name,
            indent: &options.indent,
        }
    }

    /// Read `path`, rewrite its relative specifiers and wrap it.
    ///
    /// Fails when the file cannot be read, or with
    /// [`BundleError::FileNotFound`] when a specifier spelling out `.d.ts`
    /// does not resolve.
    pub fn process(&self, path: &Path) -> Result<DeclarationFile> {
        let absolute_path = normalize(path);
        debug!("Processing declaration file: {}", absolute_path.display());

        let mut content = self.gateway.read_text(&absolute_path)?;
        let module_relative_path = module_relative_path(&self.base_dir, &absolute_path);
        let imports = self.rewrite_specifiers(&absolute_path, &mut content)?;

        let module_name = self.module_name_for(&absolute_path);
        let content = content.replace(DECLARE_KEYWORD, "");
        let content = wrap_module(&module_name, &indent_lines(&content, self.indent));

        debug!(
            "Wrapped {} as module '{}' with {} relative imports",
            absolute_path.display(),
            module_name,
            imports.len()
        );
        Ok(DeclarationFile { absolute_path, module_relative_path, module_name, content, imports })
    }

    /// Rewrite every live relative specifier in place and return the
    /// resolved files, in source order.
    fn rewrite_specifiers(&self, importer: &Path, content: &mut String) -> Result<Vec<PathBuf>> {
        let mut imports = Vec::new();
        let mut cursor = 0;

        loop {
            let (start, end, spec_start, spec_end, specifier) = {
                let Some(caps) = SPECIFIER_SENTENCE.captures_at(content.as_str(), cursor) else {
                    break;
                };
                let Some(whole) = caps.get(0) else {
                    break;
                };
                let Some(spec) = caps.get(1).or_else(|| caps.get(2)) else {
                    cursor = whole.end();
                    continue;
                };
                (whole.start(), whole.end(), spec.start(), spec.end(), spec.as_str().to_string())
            };

            if is_in_string_or_comment(content.as_str(), start) {
                trace!("Skipping '{}' inside a string or comment", specifier);
                cursor = end;
                continue;
            }

            match resolve_specifier(self.gateway, importer, &specifier) {
                Some(resolved) => {
                    let rewritten = self.module_name_for(&resolved);
                    trace!("Rewriting '{}' to '{}'", specifier, rewritten);
                    content.replace_range(spec_start..spec_end, &rewritten);
                    cursor = end - (spec_end - spec_start) + rewritten.len();
                    imports.push(resolved);
                }
                None if specifier.ends_with(DTS_SUFFIX) => {
                    return Err(BundleError::FileNotFound {
                        specifier,
                        importer: importer.to_path_buf(),
                    }
                    .into());
                }
                None => {
                    // Value-only modules have no declarations; the whole
                    // sentence goes, not just the specifier
                    warn!(
                        "No declarations for '{}' in {}, dropping the statement",
                        specifier,
                        importer.display()
                    );
                    content.replace_range(start..end, "");
                    cursor = start;
                }
            }
        }

        Ok(imports)
    }

    /// `library` for the entry file, `library/<relative path>` otherwise
    fn module_name_for(&self, file: &Path) -> String {
        if file == self.entry {
            self.library_name.to_string()
        } else {
            format!("{}{}", self.library_name, module_relative_path(&self.base_dir, file))
        }
    }
}

fn indent_lines(content: &str, indent: &str) -> String {
    content
        .split('\n')
        .map(|line| if line.is_empty() { String::new() } else { format!("{indent}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_module(module_name: &str, body: &str) -> String {
    format!("declare module \"{module_name}\" {{\n{body}}}\n")
}
