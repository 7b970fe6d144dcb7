// SPDX-License-Identifier: MIT

//! Named rules built on conditions
//!
//! - `RuleSetDefinition` - rule file schema (YAML or JSON)
//! - `RuleSet` - compiled rules, evaluated together against one record
//! - `RuleRegistry` - concurrent map of named conditions used by the service

pub mod loader;
pub mod registry;
pub mod ruleset;
pub mod types;

pub use loader::RuleSetLoader;
pub use registry::RuleRegistry;
pub use ruleset::{Rule, RuleOutcome, RuleSet};
pub use types::{RuleDefinition, RuleSetDefinition};
