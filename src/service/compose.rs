// ABOUTME: Locates and reads a compose project's file.
// ABOUTME: Searches configured files, then conventional names, then the process directory.

use crate::runtime::{EngineError, EngineResult, traits::RuntimeInfo};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional compose file names, in lookup order.
pub const COMPOSE_FILE_NAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Which project to look up, usually taken from compose labels.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeQuery {
    pub project_name: String,
    #[serde(default)]
    pub working_dir: Option<String>,
    /// Comma-separated list, absolute or relative to `working_dir`.
    #[serde(default)]
    pub config_files: Option<String>,
}

impl ComposeQuery {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn config_files(mut self, files: impl Into<String>) -> Self {
        self.config_files = Some(files.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposeFile {
    pub file_name: String,
    pub file_path: String,
    pub content: String,
    pub project_name: String,
}

/// Look up a compose file.
///
/// Paths under `working_dir` are read through the engine so bridged sources
/// see translated paths. The fallback search in `cwd` uses the local filesystem.
pub async fn find_compose_file<E>(engine: &E, query: &ComposeQuery, cwd: &Path) -> EngineResult<ComposeFile>
where
    E: RuntimeInfo + ?Sized,
{
    let project_name = query.project_name.trim();
    if project_name.is_empty() {
        return Err(EngineError::Validation("project name is required".to_string()));
    }

    let working_dir = query
        .working_dir
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let mut candidates: Vec<String> = Vec::new();
    if let (Some(dir), Some(files)) = (working_dir, query.config_files.as_deref()) {
        candidates.extend(
            files
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(|f| {
                    if is_absolute(f) {
                        f.to_string()
                    } else {
                        join(dir, f)
                    }
                }),
        );
    }
    if let Some(dir) = working_dir {
        candidates.extend(COMPOSE_FILE_NAMES.iter().map(|name| join(dir, name)));
    }

    for path in candidates {
        if let Some(content) = engine.read_host_file(&path).await? {
            tracing::debug!(path = %path, "found compose file");
            return Ok(ComposeFile {
                file_name: file_name(&path),
                file_path: path,
                content,
                project_name: project_name.to_string(),
            });
        }
    }

    for name in COMPOSE_FILE_NAMES {
        let path = cwd.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                return Ok(ComposeFile {
                    file_name: name.to_string(),
                    file_path: path.display().to_string(),
                    content,
                    project_name: project_name.to_string(),
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "compose candidate unreadable");
            }
        }
    }

    let mut searched: Vec<String> = working_dir.map(str::to_string).into_iter().collect();
    searched.push(cwd.display().to_string());
    Err(EngineError::NotFound(format!(
        "compose file for project {project_name} (searched {})",
        searched.join(", ")
    )))
}

fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Join using the directory's own separator style.
fn join(dir: &str, name: &str) -> String {
    let sep = if dir.contains('\\') && !dir.contains('/') {
        '\\'
    } else {
        '/'
    };
    let dir = dir.trim_end_matches(['/', '\\']);
    format!("{dir}{sep}{name}")
}

fn file_name(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_string()
}
