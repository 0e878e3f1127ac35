use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub const DEFAULT_DOCUMENT_DIR: &str = "data";
pub const DEFAULT_DOCUMENT_FILE: &str = "MISSION_CONTROL.md";

/// Where the mission control document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOrigin {
    Path(PathBuf),
    Stdin,
}

impl DocumentOrigin {
    /// `-` selects standard input; anything else is a path.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            DocumentOrigin::Stdin
        } else {
            DocumentOrigin::Path(arg.to_path_buf())
        }
    }
}

impl fmt::Display for DocumentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentOrigin::Path(path) => write!(f, "{}", path.display()),
            DocumentOrigin::Stdin => f.write_str("<stdin>"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("mission control document unavailable at {origin}: {source}")]
    Unavailable {
        origin: DocumentOrigin,
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    pub fn unavailable(origin: &DocumentOrigin, source: io::Error) -> Self {
        Self::Unavailable {
            origin: origin.clone(),
            source,
        }
    }
}

pub fn default_document_path(cwd: &Path) -> PathBuf {
    cwd.join(DEFAULT_DOCUMENT_DIR).join(DEFAULT_DOCUMENT_FILE)
}

#[tracing::instrument(skip_all, fields(origin = %origin))]
pub fn load_document(origin: &DocumentOrigin) -> Result<String, DocumentError> {
    let text = match origin {
        DocumentOrigin::Path(path) => {
            debug!(file = %path.display(), "reading document");
            fs::read_to_string(path).map_err(|err| DocumentError::unavailable(origin, err))?
        }
        DocumentOrigin::Stdin => {
            debug!("reading document from stdin");
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|err| DocumentError::unavailable(origin, err))?;
            buf
        }
    };

    info!(bytes = text.len(), "loaded mission control document");
    Ok(text)
}
