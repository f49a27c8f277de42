use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CoreError;

const SIX_HOURS_MS: i64 = 6 * 60 * 60 * 1000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub conversation_cache_capacity: usize,
    pub member_colors_cache_capacity: usize,
    pub conversation_messages_cache_capacity: usize,
    /// How long a "discovered unregistered" mark keeps a contact out of the composer.
    pub unregistered_window_ms: i64,
    pub placeholder_title: String,
    /// Panic on invalid-state access instead of logging and returning a default.
    pub strict_assertions: bool,
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            conversation_cache_capacity: 2000,
            member_colors_cache_capacity: 100,
            conversation_messages_cache_capacity: 50,
            unregistered_window_ms: SIX_HOURS_MS,
            placeholder_title: "Unknown contact".to_string(),
            strict_assertions: false,
            diagnostics_dir: None,
        }
    }
}

impl SelectorConfig {
    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let config: SelectorConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("conversation_cache_capacity", self.conversation_cache_capacity),
            ("member_colors_cache_capacity", self.member_colors_cache_capacity),
            (
                "conversation_messages_cache_capacity",
                self.conversation_messages_cache_capacity,
            ),
        ] {
            if value == 0 {
                return Err(CoreError::InvalidArgument(format!("{} must be non-zero", name)));
            }
        }
        if self.unregistered_window_ms <= 0 {
            return Err(CoreError::InvalidArgument(
                "unregistered_window_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Clamps a configured capacity to at least one entry.
pub(crate) fn capacity(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN)
}
