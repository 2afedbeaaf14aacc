//! External tool resolution
//!
//! The prober and encoder are external collaborators. When the user
//! supplies an explicit path it is used as-is; otherwise the default
//! tool name is resolved through the executable search path.

use std::path::{Path, PathBuf};

use crate::errors::{Result, VidFitError};

/// Resolve a tool: explicit override wins, else PATH lookup of `default_name`.
pub fn resolve_tool(override_path: Option<&Path>, default_name: &str) -> Result<PathBuf> {
    match override_path {
        Some(path) => {
            if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(VidFitError::ToolNotFound(format!(
                    "{} (explicit path does not exist)",
                    path.display()
                )))
            }
        }
        None => which::which(default_name).map_err(|_| {
            VidFitError::ToolNotFound(format!(
                "{} (not on PATH; install ffmpeg or pass an explicit path)",
                default_name
            ))
        }),
    }
}
