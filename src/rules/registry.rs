// SPDX-License-Identifier: MIT

use super::ruleset::RuleSet;
use crate::condition::{Condition, EvalError, Record};
use crate::error::RulesError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared, named conditions. Clones share the same map.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: Arc<RwLock<HashMap<String, Arc<Condition>>>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, name: impl Into<String>, condition: Condition) {
        let mut rules = self.rules.write().await;
        rules.insert(name.into(), Arc::new(condition));
    }

    /// Compile and register; nothing is registered if compilation fails
    pub async fn compile_and_register(
        &self,
        name: impl Into<String>,
        source: &str,
    ) -> Result<(), EvalError> {
        let condition = Condition::compile(source)?;
        self.register(name, condition).await;
        Ok(())
    }

    /// Register every rule of a compiled rule set
    pub async fn load_rule_set(&self, set: &RuleSet) {
        let mut rules = self.rules.write().await;
        for rule in set.rules() {
            rules.insert(rule.name.clone(), Arc::new(rule.condition.clone()));
        }
        log::info!("Registered {} rules from '{}'", set.len(), set.name());
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Condition>> {
        let rules = self.rules.read().await;
        rules.get(name).cloned()
    }

    pub async fn remove(&self, name: &str) -> Option<Arc<Condition>> {
        let mut rules = self.rules.write().await;
        rules.remove(name)
    }

    /// Registered names, sorted
    pub async fn names(&self) -> Vec<String> {
        let rules = self.rules.read().await;
        let mut names: Vec<String> = rules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Evaluate a registered rule. The lock is released before evaluation.
    pub async fn evaluate(&self, name: &str, record: &Record) -> Result<bool, RulesError> {
        let condition = self
            .get(name)
            .await
            .ok_or_else(|| RulesError::UnknownRule(name.to_string()))?;
        Ok(condition.evaluate(record)?)
    }

    /// Evaluate every registered rule, sorted by name
    pub async fn evaluate_all(&self, record: &Record) -> Vec<(String, Result<bool, EvalError>)> {
        let snapshot: Vec<(String, Arc<Condition>)> = {
            let rules = self.rules.read().await;
            rules
                .iter()
                .map(|(name, condition)| (name.clone(), condition.clone()))
                .collect()
        };

        let mut outcomes: Vec<_> = snapshot
            .into_iter()
            .map(|(name, condition)| {
                let result = condition.evaluate(record);
                (name, result)
            })
            .collect();
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        outcomes
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
