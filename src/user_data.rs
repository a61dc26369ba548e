//! Startup payload resolution for launched instances.
//!
//! User data can be passed inline or read from a file. The payload is opaque:
//! it is forwarded byte for byte (after Base64 encoding by the launcher), so
//! no emptiness or format checks are applied to its content.

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

/// Errors raised while resolving user data.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum UserDataError {
    /// Raised when both inline and file sources are provided.
    #[error("user data cannot be provided both inline and via file")]
    BothProvided,
    /// Raised when a file path is empty or only whitespace.
    #[error("user data file path must not be empty")]
    FilePathEmpty,
    /// Raised when reading the file source fails.
    #[error("failed to read user data file `{path}`: {message}")]
    FileRead {
        /// Expanded path that failed to read.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

/// Resolves user data from either an inline value or a file.
///
/// Returns an empty payload when neither source is given.
///
/// # Errors
///
/// Returns [`UserDataError`] when both sources are given, the path is blank,
/// or the file cannot be read.
pub fn resolve_user_data(
    inline: Option<&str>,
    file: Option<&str>,
) -> Result<String, UserDataError> {
    match (inline, file) {
        (Some(_), Some(_)) => Err(UserDataError::BothProvided),
        (Some(payload), None) => Ok(payload.to_owned()),
        (None, None) => Ok(String::new()),
        (None, Some(path)) => {
            if path.trim().is_empty() {
                return Err(UserDataError::FilePathEmpty);
            }
            let expanded = expand_tilde(path);
            read_to_string_ambient(&expanded).map_err(|message| UserDataError::FileRead {
                path: expanded.clone(),
                message,
            })
        }
    }
}

/// Expands a leading `~/` using the `HOME` environment variable.
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return format!("{}/{rest}", home.to_string_lossy());
    }
    path.to_owned()
}

fn read_to_string_ambient(path: &str) -> Result<String, String> {
    let path_buf = Utf8Path::new(path);

    let (dir_path, file_path) = if path_buf.is_absolute() {
        let parent = path_buf
            .parent()
            .ok_or_else(|| format!("path has no parent directory: {path_buf}"))?;
        let file_name = path_buf
            .file_name()
            .ok_or_else(|| format!("path has no file name: {path_buf}"))?;
        (parent, Utf8Path::new(file_name))
    } else {
        (Utf8Path::new("."), path_buf)
    };

    let dir =
        Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(|err| err.to_string())?;
    dir.read_to_string(file_path).map_err(|err| err.to_string())
}
