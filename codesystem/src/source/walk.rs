//! Code file discovery

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{PipelineError, PipelineResult};

/// Extensions (without dot) treated as source code
pub const DEFAULT_EXTENSIONS: [&str; 12] = [
    "py", "js", "java", "cpp", "c", "h", "hpp", "cs", "rb", "go", "rs", "php",
];

const SKIPPED_DIRS: [&str; 1] = [".git"];

/// Find all files under `root` whose extension is in `extensions`, sorted
pub async fn find_code_files(root: &Path, extensions: &[String]) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await.map_err(|source| read_error(&dir, source))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| read_error(&dir, source))?
        {
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(_) => continue,
            };

            if file_type.is_dir() {
                let skipped = path
                    .file_name()
                    .map(|name| SKIPPED_DIRS.iter().any(|s| name == *s))
                    .unwrap_or(false);
                if !skipped {
                    pending.push(path);
                }
            } else if file_type.is_file() && has_code_extension(&path, extensions) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_code_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn read_error(dir: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::SourceRead {
        path: dir.display().to_string(),
        source,
    }
}
