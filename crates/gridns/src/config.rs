// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default rows requested per sub-query
pub const DEFAULT_PAGE_SIZE: usize = 5000;

/// Engine configuration, read once at the start of every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Synthesize stand-in records for `/`, `/<zone>` and `/<zone>/home`
    /// when strict ACLs hide them but a deeper well-known path is visible
    pub fallback_to_public_under_root: bool,
    pub page_size: usize,
    /// Upper bound applied to a caller's page size hint
    pub max_page_size: usize,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            fallback_to_public_under_root: false,
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl NamespaceConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: NamespaceConfig = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::config(format!("cannot parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::config("page_size must be at least 1"));
        }
        if self.max_page_size < self.page_size {
            return Err(Error::config(format!(
                "max_page_size {} is smaller than page_size {}",
                self.max_page_size, self.page_size
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_public_under_root = enabled;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Rows per sub-query for a call with an optional hint
    #[must_use]
    pub fn effective_page_size(&self, hint: Option<usize>) -> usize {
        hint.unwrap_or(self.page_size).clamp(1, self.max_page_size.max(1))
    }
}
