use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{DEFAULT_BATCH_SIZE, SOURCE_TABLE, TARGET_TABLE};
use crate::error::{Result, WardeadError};

/// Connection details for the Supabase REST API.
///
/// Built once at startup and handed to the client; nothing else reads the
/// environment.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    /// Config via env:
    /// - SUPABASE_URL or PUBLIC_SUPABASE_URL (e.g., https://xyzcompany.supabase.co), OR SUPABASE_PROJECT_REF
    /// - SUPABASE_SERVICE_ROLE_KEY, falling back to PUBLIC_SUPABASE_ANON_KEY
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve the config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let url = non_empty("SUPABASE_URL")
            .or_else(|| non_empty("PUBLIC_SUPABASE_URL"))
            .or_else(|| non_empty("SUPABASE_PROJECT_REF").map(|r| format!("https://{}.supabase.co", r)))
            .ok_or_else(|| {
                WardeadError::Config(
                    "missing SUPABASE_URL, PUBLIC_SUPABASE_URL or SUPABASE_PROJECT_REF".to_string(),
                )
            })?;

        let key = non_empty("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|| non_empty("PUBLIC_SUPABASE_ANON_KEY"))
            .ok_or_else(|| {
                WardeadError::Config(
                    "missing SUPABASE_SERVICE_ROLE_KEY or PUBLIC_SUPABASE_ANON_KEY".to_string(),
                )
            })?;

        Ok(Self::new(url, key))
    }
}

/// What to do when the store rejects a write batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BatchFailurePolicy {
    /// Stop after the first failed batch; later batches are not attempted
    #[default]
    Abort,
    /// Log the failure and keep sending the remaining batches
    Continue,
}

/// Tables, batch size and failure policy for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub source_table: String,
    pub target_table: String,
    pub batch_size: usize,
    pub on_batch_error: BatchFailurePolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source_table: SOURCE_TABLE.to_string(),
            target_table: TARGET_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            on_batch_error: BatchFailurePolicy::default(),
        }
    }
}

impl PipelineSettings {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            WardeadError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: PipelineSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(WardeadError::Config("batch_size must be at least 1".to_string()));
        }
        if self.source_table.trim().is_empty() || self.target_table.trim().is_empty() {
            return Err(WardeadError::Config("table names must not be empty".to_string()));
        }
        Ok(())
    }
}
