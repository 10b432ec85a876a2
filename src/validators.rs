//! Path validation for command-line inputs and the output destination.

use std::io;

use crate::config::Config;

fn file_error_message(error: &io::Error) -> String {
    match error.kind() {
        io::ErrorKind::NotFound => "File not found".to_string(),
        io::ErrorKind::PermissionDenied => "Cannot access file".to_string(),
        _ => "Invalid path".to_string(),
    }
}

fn directory_error_message(error: &io::Error) -> String {
    match error.kind() {
        io::ErrorKind::NotFound => "Directory not found".to_string(),
        io::ErrorKind::PermissionDenied => "Cannot access directory".to_string(),
        _ => "Invalid path".to_string(),
    }
}

/// Validate that a path points to an existing file.
/// Returns an error message if validation fails, None if valid.
pub fn validate_file_exists(path: &str) -> Option<String> {
    if path.is_empty() {
        return Some("Path cannot be empty".to_string());
    }

    match std::fs::metadata(Config::expand_tilde(path)) {
        Ok(metadata) if metadata.is_file() => None,
        Ok(_) => Some("Path is not a file".to_string()),
        Err(e) => Some(file_error_message(&e)),
    }
}

/// Validate that a path points to an existing directory.
/// Returns an error message if validation fails, None if valid.
pub fn validate_directory_exists(path: &str) -> Option<String> {
    if path.is_empty() {
        return Some("Path cannot be empty".to_string());
    }

    match std::fs::metadata(Config::expand_tilde(path)) {
        Ok(metadata) if metadata.is_dir() => None,
        Ok(_) => Some("Path is not a directory".to_string()),
        Err(e) => Some(directory_error_message(&e)),
    }
}

/// Validate that the parent directory of an output file exists.
/// A bare file name refers to the current directory and is always valid.
pub fn validate_output_parent(path: &str) -> Option<String> {
    if path.is_empty() {
        return Some("Path cannot be empty".to_string());
    }

    match Config::expand_tilde(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            validate_directory_exists(&parent.to_string_lossy())
        }
        _ => None,
    }
}
