//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upload endpoint and admission limits used by the worker.
    pub upload: UploadCfg,
    /// Gemini settings for the post-upload feedback message.
    pub gemini: GeminiCfg,
}

/// Webhook endpoint and file admission limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCfg {
    /// Apps Script web app URL that receives each file.
    pub script_url: String,
    /// Per-file size ceiling in megabytes.
    pub max_file_size_mb: u64,
}

/// Gemini API related values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiCfg {
    /// API key; leave empty to use the built-in local feedback.
    pub api_key: String,
    /// Model name passed to generateContent.
    pub model: String,
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }

    /// Submissions are blocked until an endpoint is configured.
    pub fn script_url_missing(&self) -> bool {
        self.upload.script_url.trim().is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload: UploadCfg {
                script_url: "".into(),
                max_file_size_mb: 10,
            },
            gemini: GeminiCfg {
                api_key: "".into(),
                model: "gemini-3-flash-preview".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_endpoint() {
        let cfg = Config::default();
        assert!(cfg.script_url_missing());
        assert_eq!(cfg.upload.max_file_size_mb, 10);
        assert_eq!(cfg.gemini.model, "gemini-3-flash-preview");
    }

    #[test]
    fn test_config_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.upload.script_url = "https://script.google.com/macros/s/abc/exec".into();
        cfg.gemini.api_key = "k".into();

        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.upload.script_url, cfg.upload.script_url);
        assert!(!back.script_url_missing());
    }
}
