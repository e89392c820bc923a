//! # Rule System
//!
//! This module defines the rewrite rule trait and the rule registry consumed by the
//! [`Rewriter`](crate::rewriter::Rewriter).
//!
//! ## Rewrite Rules
//!
//! A rule looks at one plan node at a time. It declares a [`Pattern`] describing the
//! nodes it applies to; the rewriter only calls [`Rule::apply`] on nodes that match.
//! `apply` returns a replacement node, or `Ok(None)` when the node matched but there
//! is nothing to rewrite. Rules never mutate their input.
//!
//! ## Firing Once
//!
//! Rules whose output would match their own pattern again must carry that state in
//! the node they produce and exclude it with a pattern guard. Otherwise the rewriter
//! keeps re-applying them until it runs out of iterations.
//!
//! ## Rule Registry
//!
//! The `RuleRegistry` collects rules in registration order. Individual rules can be
//! switched off by name through [`RewriteConfig::disabled_rules`].

use crate::error::Result;
use crate::pattern::Pattern;
use crate::plan::LogicalPlan;
use crate::rewriter::RewriteConfig;

/// A rule rewrites a matching plan node into an equivalent one.
pub trait Rule: Send + Sync {
    /// Unique name of this rule.
    fn name(&self) -> &str;

    /// Pattern that this rule matches against.
    fn pattern(&self) -> Pattern;

    /// Apply the rule to a matching node.
    fn apply(&self, plan: &LogicalPlan) -> Result<Option<LogicalPlan>>;
}

/// Registry of rewrite rules.
pub struct RuleRegistry {
    pub rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Rules not disabled by `config`, in registration order.
    pub fn active_rules(&self, config: &RewriteConfig) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| !config.disabled_rules.iter().any(|d| d == r.name()))
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop(&'static str);

    impl Rule for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn pattern(&self) -> Pattern {
            Pattern::Any
        }

        fn apply(&self, _plan: &LogicalPlan) -> Result<Option<LogicalPlan>> {
            Ok(None)
        }
    }

    #[test]
    fn test_active_rules_respects_disabled() {
        let mut registry = RuleRegistry::new();
        registry.add_rule(Box::new(Noop("A")));
        registry.add_rule(Box::new(Noop("B")));

        let all = registry.active_rules(&RewriteConfig::default());
        assert_eq!(all.iter().map(|r| r.name()).collect::<Vec<_>>(), vec!["A", "B"]);

        let config = RewriteConfig {
            disabled_rules: vec!["A".into()],
            ..Default::default()
        };
        let active = registry.active_rules(&config);
        assert_eq!(active.iter().map(|r| r.name()).collect::<Vec<_>>(), vec!["B"]);
    }
}
