// SPDX-License-Identifier: MIT

//! Rule set loader - YAML/JSON file loading and parsing

use super::types::RuleSetDefinition;
use crate::error::RulesError;
use std::fs;
use std::path::Path;

/// Loads rule set definitions from YAML or JSON files
pub struct RuleSetLoader;

impl RuleSetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a rule set from a file; `.json` files are read as JSON, anything else as YAML
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<RuleSetDefinition, RulesError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        log::debug!("Loading rule set from {}", path.display());

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::parse_json(&content)
        } else {
            Self::parse_yaml(&content)
        }
    }

    /// Parse a rule set from a YAML string
    pub fn parse_yaml(content: &str) -> Result<RuleSetDefinition, RulesError> {
        let def: RuleSetDefinition = serde_yaml::from_str(content)?;
        Ok(def)
    }

    /// Parse a rule set from a JSON string
    pub fn parse_json(content: &str) -> Result<RuleSetDefinition, RulesError> {
        let def: RuleSetDefinition = serde_json::from_str(content)?;
        Ok(def)
    }
}

impl Default for RuleSetLoader {
    fn default() -> Self {
        Self::new()
    }
}
