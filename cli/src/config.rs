use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "mangia").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("mangia.db");

        Ok(Config { db_path })
    }

    /// Gemini API key from the environment. `API_KEY` is accepted as a
    /// fallback name; a `.env` file is loaded at startup.
    pub fn gemini_api_key() -> Result<String> {
        ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
            .context(
                "GEMINI_API_KEY is not set. Create a key in Google AI Studio and export it, \
                 or put it in a .env file",
            )
    }
}
