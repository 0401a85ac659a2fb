//! Core engine for merging a tree of generated `.d.ts` files into one.
//!
//! This crate provides:
//! - A storage abstraction over the filesystem and in-memory build assets
//! - A string/comment-aware scanner for relative import/export specifiers
//! - Per-file processing: resolution, specifier rewriting, module wrapping
//! - Depth-first tree exploration from an entry declaration file
//! - The bundler that concatenates every module block into a single output
//!
//! # Examples
//!
//! ```no_run
//! use dtsbundle_core::{BundleOptions, Bundler, FsGateway};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut options = BundleOptions::new("dist/index.d.ts", "dist/bundle.d.ts", "my-lib");
//! options.initialize()?;
//!
//! let gateway = FsGateway;
//! let result = Bundler::new(&options, &gateway).bundle()?;
//! println!("{} modules written to {}", result.files_bundled, result.output.display());
//! # Ok(())
//! # }
//! ```

mod bundler;
mod config;
mod constants;
mod error;
mod explorer;
mod processor;
mod resolver;
mod scanner;
mod storage;
mod types;

// Re-export public API
pub use bundler::Bundler;
pub use config::BundleOptions;
pub use constants::{DEFAULT_INDENT, DTS_SUFFIX, INDEX_STEM};
pub use error::BundleError;
pub use explorer::TreeExplorer;
pub use processor::DeclarationProcessor;
pub use scanner::is_in_string_or_comment;
pub use storage::{AssetGateway, FsGateway, StorageGateway};
pub use types::{BundleResult, DeclarationFile};
