// SPDX-License-Identifier: MIT

//! Boolean condition DSL for feature-flag targeting, routing rules and event filters.
//!
//! ```
//! use condition_rs::condition::{compile, Record};
//!
//! let condition = compile(r#"age > 18 and tags in ["beta", "staff"]"#).unwrap();
//! let record: Record = serde_json::from_str(r#"{"age": 30, "tags": "beta"}"#).unwrap();
//! assert!(condition.evaluate(&record).unwrap());
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod rules;
pub mod server;

pub use condition::{compile, Condition, EvalError, Record, Value};
pub use error::RulesError;
