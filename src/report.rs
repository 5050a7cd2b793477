//! Aggregated validation results.

use colored::Colorize;
use serde::Serialize;

use crate::rules::RuleViolation;

/// Outcome of one dependency validation run: detected cycles first, then
/// rule violations. Passing means both lists are empty.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Each cycle is a closed walk of kustomization names, first element
    /// repeated as the last.
    pub cycles: Vec<Vec<String>>,
    pub violations: Vec<RuleViolation>,
}

impl Report {
    pub fn pass(&self) -> bool {
        self.cycles.is_empty() && self.violations.is_empty()
    }

    /// Exit status for a process-level caller.
    pub fn exit_code(&self) -> i32 {
        if self.pass() {
            0
        } else {
            1
        }
    }

    /// Render a cycle as its node sequence joined by arrows.
    pub fn render_cycle(cycle: &[String]) -> String {
        cycle.join(" → ")
    }

    /// Print all findings, cycles before violations.
    pub fn print(&self) {
        if !self.cycles.is_empty() {
            println!("{} Circular dependencies detected:", "✗".red());
            for cycle in &self.cycles {
                println!("   {}", Self::render_cycle(cycle));
            }
        }

        for violation in &self.violations {
            println!("{} {}", "✗".red(), violation);
        }
    }
}
