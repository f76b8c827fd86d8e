// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report configuration.

use crate::errors::ReportConfigParseError;
use serde::Deserialize;

/// Controls what the [`XmlAggregator`](crate::xml::XmlAggregator) stores in its report.
///
/// Can be read from the `[xml]` table of a TOML document with [`Self::from_toml_str`]:
///
/// ```toml
/// [xml]
/// store-success-output = false
/// store-skipped-output = true
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ReportConfig {
    store_success_output: bool,
    store_failure_output: bool,
    store_skipped_output: bool,
    store_traits: bool,
}

impl ReportConfig {
    /// Parses configuration from the `[xml]` table of a TOML document.
    ///
    /// Keys missing from the table, or a missing table, take their default values. Tables other
    /// than `[xml]` are ignored.
    pub fn from_toml_str(input: &str) -> Result<Self, ReportConfigParseError> {
        let document: ConfigDocument = toml::from_str(input).map_err(ReportConfigParseError::new)?;
        Ok(Self::new(document.xml.as_ref()))
    }

    fn new(custom_data: Option<&ReportConfigImpl>) -> Self {
        let defaults = Self::default();
        let custom = |f: fn(&ReportConfigImpl) -> Option<bool>, default: bool| {
            custom_data.and_then(f).unwrap_or(default)
        };
        Self {
            store_success_output: custom(
                |c| c.store_success_output,
                defaults.store_success_output,
            ),
            store_failure_output: custom(
                |c| c.store_failure_output,
                defaults.store_failure_output,
            ),
            store_skipped_output: custom(
                |c| c.store_skipped_output,
                defaults.store_skipped_output,
            ),
            store_traits: custom(|c| c.store_traits, defaults.store_traits),
        }
    }

    /// Returns true if output from passing tests should be stored.
    pub fn store_success_output(&self) -> bool {
        self.store_success_output
    }

    /// Returns true if output from failing tests should be stored.
    pub fn store_failure_output(&self) -> bool {
        self.store_failure_output
    }

    /// Returns true if output from skipped tests should be stored.
    pub fn store_skipped_output(&self) -> bool {
        self.store_skipped_output
    }

    /// Returns true if test traits should be stored.
    pub fn store_traits(&self) -> bool {
        self.store_traits
    }

    /// Sets whether output from passing tests should be stored.
    pub fn set_store_success_output(&mut self, store: bool) -> &mut Self {
        self.store_success_output = store;
        self
    }

    /// Sets whether output from failing tests should be stored.
    pub fn set_store_failure_output(&mut self, store: bool) -> &mut Self {
        self.store_failure_output = store;
        self
    }

    /// Sets whether output from skipped tests should be stored.
    pub fn set_store_skipped_output(&mut self, store: bool) -> &mut Self {
        self.store_skipped_output = store;
        self
    }

    /// Sets whether test traits should be stored.
    pub fn set_store_traits(&mut self, store: bool) -> &mut Self {
        self.store_traits = store;
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            store_success_output: true,
            store_failure_output: true,
            store_skipped_output: false,
            store_traits: true,
        }
    }
}

#[derive(Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    xml: Option<ReportConfigImpl>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ReportConfigImpl {
    #[serde(default)]
    store_success_output: Option<bool>,
    #[serde(default)]
    store_failure_output: Option<bool>,
    #[serde(default)]
    store_skipped_output: Option<bool>,
    #[serde(default)]
    store_traits: Option<bool>,
}
