//! Source acquisition: turning a CLI input into `(identifier, content)` units
//!
//! - **walk**: recursive discovery of code files under a directory
//! - **repository**: shallow clone of a remote repository into a temp dir

pub mod repository;
pub mod walk;

pub use repository::{clone_repository, ClonedRepository};
pub use walk::{find_code_files, DEFAULT_EXTENSIONS};

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{PipelineError, PipelineResult};

/// Scheme prefixes recognized as remote repositories
pub const REMOTE_PREFIXES: [&str; 3] = ["http://", "https://", "git://"];

/// What a CLI input refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Remote(String),
    Directory(String),
    File(String),
}

impl InputKind {
    pub fn classify(input: &str) -> Self {
        let input = input.trim();
        if REMOTE_PREFIXES.iter().any(|prefix| input.starts_with(prefix)) {
            Self::Remote(input.to_string())
        } else if Path::new(input).is_dir() {
            Self::Directory(input.to_string())
        } else {
            Self::File(input.to_string())
        }
    }
}

/// One piece of source text ready to be analyzed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Display label and name hint for the artifact
    pub identifier: String,
    pub content: String,
}

impl SourceUnit {
    pub fn new(identifier: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            content: content.into(),
        }
    }
}

/// A file found under a tree, not read yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the walked root
    pub label: String,
    pub path: PathBuf,
}

impl SourceFile {
    /// Read the file. `Ok(None)` means it holds only whitespace.
    pub async fn load(&self) -> PipelineResult<Option<SourceUnit>> {
        let content = read_code_file(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(SourceUnit::new(self.label.clone(), content)))
    }
}

/// Read one file as UTF-8 text
pub async fn read_code_file(path: &Path) -> PipelineResult<String> {
    fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::SourceRead {
            path: path.display().to_string(),
            source,
        })
}

/// Walk `root` and list every matching file without reading it.
///
/// Labels are paths relative to `root`.
pub async fn collect_sources(root: &Path, extensions: &[String]) -> PipelineResult<Vec<SourceFile>> {
    let files = find_code_files(root, extensions).await?;

    Ok(files
        .into_iter()
        .map(|path| SourceFile {
            label: path
                .strip_prefix(root)
                .unwrap_or(&path)
                .display()
                .to_string(),
            path,
        })
        .collect())
}
