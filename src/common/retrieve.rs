//! This file provides utility functions for loading settings and document
//! fixtures from disk.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::common::validation::Issue;
use crate::input::memory::DocumentSpec;
use crate::settings::settings::Settings;

/// Reads the file at `path` into a `String`.
///
/// # Arguments
/// * `path`: the filepath to load
pub fn load_text(path: &str) -> Result<String, Issue> {
    let file_path = Path::new(path);
    let mut f: File = match File::open(&file_path) {
        Ok(value) => value,
        Err(error) => {
            return Err(Issue::Error(format!(
                "unable to open `{}` (`{}`), skipping...",
                file_path.to_string_lossy(),
                error
            )));
        }
    };
    let mut contents = String::new();
    match f.read_to_string(&mut contents) {
        Ok(_size) => Ok(contents),
        Err(error) => Err(Issue::Error(format!(
            "unable to read `{}` (`{}`), skipping...",
            file_path.to_string_lossy(),
            error
        ))),
    }
}

fn load_ron<T: DeserializeOwned>(path: &str) -> Result<T, Issue> {
    let contents = load_text(path)?;
    match ron::de::from_str(contents.as_str()) {
        Ok(value) => Ok(value),
        Err(error) => Err(Issue::Error(format!(
            "unable to deserialize `{}` (`{}`)",
            path, error
        ))),
    }
}

/// Loads a `Settings` snapshot stored as RON.
pub fn load_settings(path: &str) -> Result<Settings, Issue> {
    load_ron(path)
}

/// Loads a document fixture stored as RON.
pub fn load_document(path: &str) -> Result<DocumentSpec, Issue> {
    load_ron(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        match load_settings("/nonexistent/veil/settings.ron") {
            Err(Issue::Error(message)) => assert!(message.contains("unable to open")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_through_disk() {
        let path = std::env::temp_dir().join(format!("veil-settings-{}.ron", std::process::id()));
        std::fs::write(&path, "(blacklist:{\"spoiler\":true})").unwrap();
        let settings = load_settings(path.to_str().unwrap()).unwrap();
        assert!(settings.blacklist.contains("spoiler"));
        std::fs::remove_file(&path).unwrap();
    }
}
