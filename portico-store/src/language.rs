use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::StoreResult;

const LANGUAGE_FILE: &str = "language.json";
const DEFAULT_LANGUAGE: &str = "en";

pub const SUPPORTED_LANGUAGES: [&str; 5] = ["en", "de", "fr", "es", "hu"];

#[derive(Debug, Serialize, Deserialize)]
struct LanguageFile {
    language: String,
}

/// Persisted kiosk display language.
pub struct LanguageStore {
    dir: PathBuf,
}

impl LanguageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn get(&self) -> String {
        fs::read_to_string(self.dir.join(LANGUAGE_FILE))
            .ok()
            .and_then(|text| serde_json::from_str::<LanguageFile>(&text).ok())
            .map(|f| f.language)
            .filter(|l| SUPPORTED_LANGUAGES.contains(&l.as_str()))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    /// Unsupported codes are ignored and the current selection kept.
    pub fn set(&self, language: &str) -> StoreResult<bool> {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            tracing::warn!(language, "unsupported language ignored");
            return Ok(false);
        }
        fs::create_dir_all(&self.dir)?;
        let file = LanguageFile {
            language: language.to_string(),
        };
        fs::write(
            self.dir.join(LANGUAGE_FILE),
            serde_json::to_vec_pretty(&file)?,
        )?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_to_english() {
        let dir = TempDir::new().unwrap();
        let store = LanguageStore::new(dir.path());
        assert_eq!(store.get(), "en");
    }

    #[test]
    fn test_set_and_reject() {
        let dir = TempDir::new().unwrap();
        let store = LanguageStore::new(dir.path());

        assert!(store.set("de").unwrap());
        assert_eq!(store.get(), "de");

        assert!(!store.set("xx").unwrap());
        assert_eq!(store.get(), "de");
    }
}
