// SPDX-License-Identifier: MIT

//! Compiled rule sets

use super::types::RuleSetDefinition;
use crate::condition::{Condition, EvalError, Record};
use crate::error::RulesError;
use std::collections::HashSet;

/// A compiled, named condition
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub description: String,
    pub condition: Condition,
}

/// The result of one rule against one record
#[derive(Debug)]
pub struct RuleOutcome<'a> {
    pub rule: &'a str,
    pub result: Result<bool, EvalError>,
}

/// Rules compiled from a [`RuleSetDefinition`], kept in file order
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile every rule; the first failing rule aborts compilation
    pub fn compile(def: &RuleSetDefinition) -> Result<Self, RulesError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(def.rules.len());

        for rule in &def.rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(RulesError::DuplicateRule(rule.name.clone()));
            }
            let condition = Condition::compile(&rule.when)
                .map_err(|e| RulesError::compile(&rule.name, e))?;
            rules.push(Rule {
                name: rule.name.clone(),
                description: rule.description.clone(),
                condition,
            });
        }

        log::info!("Compiled rule set '{}' ({} rules)", def.name, rules.len());
        Ok(Self {
            name: def.name.clone(),
            rules,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against the record
    pub fn evaluate(&self, record: &Record) -> Vec<RuleOutcome<'_>> {
        self.rules
            .iter()
            .map(|rule| RuleOutcome {
                rule: &rule.name,
                result: rule.condition.evaluate(record),
            })
            .collect()
    }

    /// Names of the rules that match; rules that fail to evaluate are skipped
    pub fn matching(&self, record: &Record) -> Vec<&str> {
        self.evaluate(record)
            .into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(true) => Some(outcome.rule),
                Ok(false) => None,
                Err(e) => {
                    log::warn!("Rule {} failed: {}", outcome.rule, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ErrorKind;
    use crate::rules::loader::RuleSetLoader;
    use serde_json::json;

    fn rule_set(yaml: &str) -> Result<RuleSet, RulesError> {
        RuleSet::compile(&RuleSetLoader::parse_yaml(yaml).unwrap())
    }

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    const ROUTING: &str = r#"
name: routing
rules:
  - name: adults
    when: age >= 18
  - name: beta
    when: 'tags in ["beta"]'
  - name: eu
    when: 'region == "eu"'
"#;

    #[test]
    fn test_compile_keeps_file_order() {
        let set = rule_set(ROUTING).unwrap();
        assert_eq!(set.name(), "routing");
        assert_eq!(set.len(), 3);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["adults", "beta", "eu"]);
        assert!(set.get("beta").is_some());
        assert!(set.get("gamma").is_none());
    }

    #[test]
    fn test_evaluate_reports_every_outcome() {
        let set = rule_set(ROUTING).unwrap();
        let outcomes = set.evaluate(&record(json!({"age": 20, "tags": "beta"})));

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].rule, "adults");
        assert_eq!(outcomes[0].result.as_ref().ok(), Some(&true));
        assert_eq!(outcomes[1].result.as_ref().ok(), Some(&true));
        assert_eq!(
            outcomes[2].result.as_ref().unwrap_err().kind(),
            ErrorKind::FieldNotFound
        );
    }

    #[test]
    fn test_matching_skips_failures() {
        let set = rule_set(ROUTING).unwrap();
        let record = record(json!({"age": 20, "tags": "alpha"}));
        assert_eq!(set.matching(&record), vec!["adults"]);
    }

    #[test]
    fn test_duplicate_rule_names() {
        let yaml = r#"
name: dup
rules:
  - name: a
    when: x > 1
  - name: a
    when: y > 1
"#;
        assert!(matches!(rule_set(yaml), Err(RulesError::DuplicateRule(n)) if n == "a"));
    }

    #[test]
    fn test_compile_error_names_rule() {
        let yaml = r#"
name: broken
rules:
  - name: ok
    when: x > 1
  - name: bad
    when: x >
"#;
        match rule_set(yaml) {
            Err(RulesError::Compile { rule, source }) => {
                assert_eq!(rule, "bad");
                assert_eq!(source.kind(), ErrorKind::AggregatedSyntaxError);
            }
            other => panic!("Expected compile error, got {:?}", other),
        }
    }
}
