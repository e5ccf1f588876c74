//! Blob addressing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Blob names must be from 1 to 1024 characters long.
pub const MAX_BLOB_NAME_CHARS: usize = 1024;

/// Over-long names are cut down to this many characters.
pub const TRUNCATED_BLOB_NAME_CHARS: usize = 1000;

/// Stand-in for an empty blob name.
pub const EMPTY_BLOB_NAME: &str = "none";

/// Address of one object: a container plus an object name inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ObjectRef {
    pub container: String,
    pub name: String,
}

impl ObjectRef {
    pub fn new(container: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            name: name.into(),
        }
    }

    /// Last path segment of the object name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Lowercased extension including the dot, e.g. `.mp4`.
    pub fn extension(&self) -> Option<String> {
        let file_name = self.file_name();
        let dot = file_name.rfind('.')?;
        if dot + 1 == file_name.len() {
            return None;
        }
        Some(file_name[dot..].to_lowercase())
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.name)
    }
}

/// Make a file name usable as a blob name.
///
/// Empty names become `"none"`; names longer than 1024 characters are cut to
/// their first 1000 characters.
pub fn safe_blob_name(filename: &str) -> String {
    if filename.is_empty() {
        error!("Filename is too short");
        return EMPTY_BLOB_NAME.to_string();
    }

    if filename.chars().count() > MAX_BLOB_NAME_CHARS {
        error!(length = filename.len(), "Filename is too long, truncating");
        return filename.chars().take(TRUNCATED_BLOB_NAME_CHARS).collect();
    }

    filename.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid container name '{0}': must be 3-63 characters of lowercase letters, digits and \
     single dashes, starting and ending with a letter or digit"
)]
pub struct ContainerNameError(pub String);

/// Validate a container name.
///
/// Names are 3 to 63 characters long, use lowercase letters, digits and the
/// dash, and every dash sits between two letters or digits.
pub fn validate_container_name(name: &str) -> Result<(), ContainerNameError> {
    let bytes = name.as_bytes();
    let len_ok = (3..=63).contains(&bytes.len());
    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    let chars_ok = bytes.iter().enumerate().all(|(i, &b)| {
        if b == b'-' {
            i > 0 && i + 1 < bytes.len() && is_alnum(bytes[i - 1]) && is_alnum(bytes[i + 1])
        } else {
            is_alnum(b)
        }
    });

    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(ContainerNameError(name.to_string()))
    }
}
