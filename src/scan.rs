//! Input directory listing

use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use crate::error::ScanError;

/// Extension matched, case-insensitively, when listing a directory
pub const WAV_EXTENSION: &str = ".wav";

/// Whether `name` ends with `.wav`, ignoring ASCII case
pub fn has_wav_extension(name: &str) -> bool {
    let ext_len = WAV_EXTENSION.len();
    name.len() >= ext_len
        && name.is_char_boundary(name.len() - ext_len)
        && name[name.len() - ext_len..].eq_ignore_ascii_case(WAV_EXTENSION)
}

/// List the `.wav` files directly inside `dir`, sorted by path
///
/// Subdirectories are not descended into. Entries whose names are not
/// valid UTF-8 are ignored.
pub fn scan_wav_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, ScanError> {
    let dir = dir.as_ref();
    let unreadable = |source| ScanError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !has_wav_extension(name) {
            continue;
        }

        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else {
            trace!("ignoring non-file entry {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}
