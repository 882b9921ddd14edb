//! Locator source locations and discovery order

use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Directory that holds the locator file, relative to a base location
pub const ELEMENTS_DIR: &str = "elements-info";

/// Locator file name
pub const ELEMENTS_FILE: &str = "elements.json";

/// Working-directory resource root
pub const RESOURCES_DIR: &str = "resources";

/// Encoding of a locator source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    #[default]
    Json,
    Yaml,
}

impl SourceFormat {
    /// Pick the format from a file extension; anything but yaml/yml is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            _ => SourceFormat::Json,
        }
    }
}

/// Ordered list of places a locator source may live.
///
/// Discovery tries the explicit path first, then the resource bundled next to
/// the executable, then the working-directory convention. The first
/// candidate that opens wins.
#[derive(Debug, Clone, Default)]
pub struct SourceCandidates {
    paths: Vec<PathBuf>,
}

impl SourceCandidates {
    /// Candidates in the given order
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Default discovery order with an optional explicit override
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        let mut paths = Vec::new();
        if let Some(path) = explicit {
            paths.push(path);
        }
        if let Some(bundled) = bundled_resource_path() {
            paths.push(bundled);
        }
        if let Some(local) = working_dir_resource_path() {
            paths.push(local);
        }
        Self { paths }
    }

    /// Candidate paths in discovery order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Open the first readable candidate.
    ///
    /// Returns the path with its reader, or every path tried when none opened.
    pub fn open_first(&self) -> Result<(PathBuf, BufReader<File>), Vec<PathBuf>> {
        let mut tried = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            match File::open(path) {
                Ok(file) => return Ok((path.clone(), BufReader::new(file))),
                Err(err) => {
                    if err.kind() != io::ErrorKind::NotFound {
                        tracing::debug!(path = %path.display(), ?err, "locator source not readable");
                    }
                    tried.push(absolute(path));
                }
            }
        }
        Err(tried)
    }
}

/// `<exe dir>/elements-info/elements.json`
pub fn bundled_resource_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let dir = exe.parent()?;
    Some(dir.join(ELEMENTS_DIR).join(ELEMENTS_FILE))
}

/// `<cwd>/resources/elements-info/elements.json`
pub fn working_dir_resource_path() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    Some(
        cwd.join(RESOURCES_DIR)
            .join(ELEMENTS_DIR)
            .join(ELEMENTS_FILE),
    )
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
