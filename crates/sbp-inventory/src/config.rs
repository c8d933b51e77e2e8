use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
const MAX_SEARCH_LIMIT: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeSettings {
    pub debounce: Duration,
    pub search_limit: u32,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl IntakeSettings {
    /// Reads `SEARCH_DEBOUNCE_MS` and `SEARCH_LIMIT` through `lookup`, so the
    /// embedding binary decides where settings come from.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(raw) = lookup("SEARCH_DEBOUNCE_MS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("SEARCH_DEBOUNCE_MS must be a number, got {raw:?}"))?;
            settings.debounce = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("SEARCH_LIMIT") {
            let limit: u32 = raw
                .trim()
                .parse()
                .with_context(|| format!("SEARCH_LIMIT must be a number, got {raw:?}"))?;
            settings.search_limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        }

        Ok(settings)
    }
}
