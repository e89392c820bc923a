//! # Fixpoint Rewrite Driver
//!
//! The `Rewriter` applies the registered rules to a logical plan until nothing
//! changes any more.
//!
//! ## How It Works
//!
//! Each pass walks the plan top-down. At every node, each active rule whose pattern
//! matches is applied in registration order; a replacement node returned by a rule is
//! what later rules (and the node's children) see. After the node's rules ran, its
//! children are rewritten the same way and the node is rebuilt over them.
//!
//! Passes repeat until one completes without any rule producing a replacement.
//!
//! ## Termination
//!
//! Rules are expected to guard against re-firing on their own output (see
//! [`Pattern::Guarded`](crate::pattern::Pattern::Guarded)). As a safety valve the
//! number of rule applications is capped by [`RewriteConfig::max_iterations`]; when
//! the cap is hit the current plan is returned as-is.

use crate::error::Result;
use crate::pattern::matches;
use crate::plan::LogicalPlan;
use crate::rule::RuleRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Configuration knobs for the rewrite driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Upper bound on the total number of rule applications.
    pub max_iterations: usize,
    /// Names of rules that must not fire.
    pub disabled_rules: Vec<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            disabled_rules: Vec::new(),
        }
    }
}

impl RewriteConfig {
    /// Parse a config from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The rewrite driver.
///
/// `iterations` counts rule applications across all passes of a single
/// [`Rewriter::rewrite`] call.
pub struct Rewriter {
    /// Registry of rules to apply.
    pub rule_registry: Arc<RuleRegistry>,
    /// Configuration limits for the rewrite.
    pub config: RewriteConfig,
    iterations: usize,
}

impl Rewriter {
    pub fn new(rule_registry: Arc<RuleRegistry>, config: RewriteConfig) -> Self {
        Self {
            rule_registry,
            config,
            iterations: 0,
        }
    }

    /// Number of rule applications performed by the last call to `rewrite`.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Rewrite `plan` to a fixpoint.
    pub fn rewrite(&mut self, plan: LogicalPlan) -> Result<LogicalPlan> {
        self.iterations = 0;
        debug!(
            "Starting rewrite: nodes={}, rules={}",
            plan.walk().len(),
            self.rule_registry.active_rules(&self.config).len()
        );

        let mut plan = plan;
        let mut passes = 0;
        loop {
            passes += 1;
            let (next, changed) = self.rewrite_node(plan)?;
            plan = next;
            if !changed {
                break;
            }
            if self.limit_reached() {
                debug!("Hit iteration limit");
                break;
            }
        }

        debug!(
            "Rewrite complete: passes={}, iterations={}",
            passes, self.iterations
        );
        Ok(plan)
    }

    fn limit_reached(&self) -> bool {
        self.iterations >= self.config.max_iterations
    }

    /// Apply matching rules to `plan`, then recurse into its children.
    /// Returns the rewritten node and whether any rule replaced anything.
    fn rewrite_node(&mut self, plan: LogicalPlan) -> Result<(LogicalPlan, bool)> {
        let registry = Arc::clone(&self.rule_registry);
        let mut plan = plan;
        let mut changed = false;

        for rule in registry.active_rules(&self.config) {
            if self.limit_reached() {
                return Ok((plan, changed));
            }
            if !matches(&plan, &rule.pattern()) {
                continue;
            }

            self.iterations += 1;
            trace!("Applying rewrite rule '{}' to {:?} node", rule.name(), plan.kind());

            if let Some(replacement) = rule.apply(&plan)? {
                trace!("  '{}' replaced the node", rule.name());
                plan = replacement;
                changed = true;
            }
        }

        let mut children_changed = false;
        let plan = plan.map_children(|child| -> Result<LogicalPlan> {
            let (child, child_changed) = self.rewrite_node(child)?;
            children_changed |= child_changed;
            Ok(child)
        })?;

        Ok((plan, changed || children_changed))
    }
}
