//! Path validation for input/output files
//!
//! Input existence, input/output conflict detection, and forcing the
//! output onto the fixed container extension.

use std::path::{Path, PathBuf};

use crate::errors::{Result, VidFitError};

/// The only container the tool writes.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Suffix for the default output filename.
pub const OUTPUT_SUFFIX: &str = "_compressed";

/// The input must exist and be a regular file.
pub fn validate_input_file(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(VidFitError::InputNotFound(input.to_path_buf()));
    }
    if !input.is_file() {
        return Err(VidFitError::PathError(format!(
            "Not a file (is it a directory?): {}",
            input.display()
        )));
    }
    Ok(())
}

/// Refuse to write the output over the input.
pub fn check_input_output_conflict(input: &Path, output: &Path) -> Result<()> {
    let input_canonical = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());

    // The output usually does not exist yet; resolve as far as possible.
    let output_canonical = if output.exists() {
        output
            .canonicalize()
            .unwrap_or_else(|_| output.to_path_buf())
    } else if output.is_relative() {
        std::env::current_dir().unwrap_or_default().join(output)
    } else {
        output.to_path_buf()
    };

    if input_canonical == output_canonical {
        return Err(VidFitError::PathError(format!(
            "Input and output are the same file: {}",
            input.display()
        )));
    }

    Ok(())
}

/// Rewrite `path` onto the fixed container extension.
///
/// Returns the path and whether it was changed.
pub fn force_output_extension(path: &Path) -> (PathBuf, bool) {
    let already_fixed = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(OUTPUT_EXTENSION))
        .unwrap_or(false);

    if already_fixed {
        (path.to_path_buf(), false)
    } else {
        (path.with_extension(OUTPUT_EXTENSION), true)
    }
}

/// Default output path: `<input stem>_compressed.mp4` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = format!("{}{}.{}", stem, OUTPUT_SUFFIX, OUTPUT_EXTENSION);
    input.with_file_name(name)
}
