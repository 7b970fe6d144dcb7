// SPDX-License-Identifier: MIT

//! Schema types for rule files
//!
//! A rule file names a set of conditions:
//!
//! ```yaml
//! name: routing
//! rules:
//!   - name: adults
//!     when: age >= 18
//! ```

use serde::{Deserialize, Serialize};

/// Top-level rule set definition
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleSetDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// A single named rule
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Condition source text
    pub when: String,
}
