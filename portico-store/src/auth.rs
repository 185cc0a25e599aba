use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::StoreResult;

const TOKEN_FILE: &str = "auth.json";

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// Persisted bearer token for the PMS. Cleared whenever the backend
/// rejects it.
pub struct AuthStore {
    dir: PathBuf,
}

impl AuthStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn get(&self) -> Option<String> {
        fs::read_to_string(self.dir.join(TOKEN_FILE))
            .ok()
            .and_then(|text| serde_json::from_str::<TokenFile>(&text).ok())
            .map(|f| f.token)
            .filter(|t| !t.is_empty())
    }

    pub fn set(&self, token: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let file = TokenFile {
            token: token.to_string(),
        };
        fs::write(self.dir.join(TOKEN_FILE), serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    pub fn clear(&self) -> StoreResult<()> {
        let path = self.dir.join(TOKEN_FILE);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
