//! Key file reading and candidate key normalization.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{TrialError, TrialResult};

lazy_static! {
    /// Accepted shape of a candidate key after cleanup: letters, digits
    /// and hyphens only.
    static ref KEY_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9-]+$").unwrap();
}

/// Normalize one line from the key file into a candidate key.
///
/// Strips surrounding whitespace, internal spaces and a byte-order mark,
/// then accepts the result only if it consists of letters, digits and
/// hyphens. Returns `None` for empty or malformed lines, which the trial
/// loop treats as "skip".
pub fn normalize_key_line(line: &str) -> Option<String> {
    let cleaned = line.trim().replace(' ', "").replace('\u{feff}', "");
    if cleaned.is_empty() {
        return None;
    }
    if KEY_PATTERN.is_match(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}

/// Read the key file as a list of raw lines.
///
/// The file is decoded as UTF-8 with invalid sequences replaced, so a
/// stray encoding problem cannot abort the run. A missing file is fatal.
pub fn read_key_lines(path: &str) -> TrialResult<Vec<String>> {
    if !Path::new(path).exists() {
        return Err(TrialError::KeyFileMissing(path.to_string()));
    }

    let bytes = fs::read(path).map_err(|source| TrialError::KeyFileRead {
        path: path.to_string(),
        source,
    })?;

    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}
