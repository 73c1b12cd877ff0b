//! Rule rows, rule sources and the merged rule set.

mod loader;
mod model;

pub use loader::{
    RuleError, RuleLoadError, load_rule_file, load_rule_source, load_rules, load_rules_with_default,
};
pub use model::{Operator, Rule, RuleKind};

use roi_model::ModuleCode;

/// Flat, read-only set of rules merged from one or more named groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Distinct group names in load order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !groups.contains(&rule.group.as_str()) {
                groups.push(&rule.group);
            }
        }
        groups
    }

    /// CROSS_COL and CONDITIONAL rules whose source is `module`.
    pub fn cross_column_for<'a>(&'a self, module: &'a ModuleCode) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |rule| {
            matches!(rule.kind, RuleKind::CrossCol | RuleKind::Conditional)
                && &rule.source_module == module
        })
    }

    pub fn cross_sheet(&self) -> impl Iterator<Item = &Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.kind == RuleKind::CrossSheet)
    }

    /// Number of rules of any kind whose source is `module`.
    pub fn count_for(&self, module: &ModuleCode) -> usize {
        self.rules
            .iter()
            .filter(|rule| &rule.source_module == module)
            .count()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
