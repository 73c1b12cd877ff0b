use std::fmt;

use roi_model::{ModuleCode, Severity};

/// The rule shapes the engines understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    /// Date comparison between two columns of one table.
    CrossCol,
    /// Source column required when the target column holds a value.
    Conditional,
    /// Source column values must exist in a column of another module.
    CrossSheet,
}

impl RuleKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "CROSS_COL" | "CROSS_COLUMN" => Some(Self::CrossCol),
            "CONDITIONAL" => Some(Self::Conditional),
            "CROSS_SHEET" | "CROSS_TABLE" => Some(Self::CrossSheet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrossCol => "CROSS_COL",
            Self::Conditional => "CONDITIONAL",
            Self::CrossSheet => "CROSS_SHEET",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Operator {
    Le,
    Lt,
    Ge,
    Gt,
    RequiredIf,
    /// Implicit operator of CROSS_SHEET rules.
    Subset,
    /// Kept verbatim so evaluation can report it as inapplicable.
    Unsupported(String),
}

impl Operator {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "<=" => Self::Le,
            "<" => Self::Lt,
            ">=" => Self::Ge,
            ">" => Self::Gt,
            "REQUIRED_IF" | "REQUIRED IF" => Self::RequiredIf,
            "SUBSET" | "IN" => Self::Subset,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Compare `left OP right`; `None` for non-comparison operators.
    pub fn compare<T: PartialOrd>(&self, left: &T, right: &T) -> Option<bool> {
        match self {
            Self::Le => Some(left <= right),
            Self::Lt => Some(left < right),
            Self::Ge => Some(left >= right),
            Self::Gt => Some(left > right),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::RequiredIf => "REQUIRED_IF",
            Self::Subset => "SUBSET",
            Self::Unsupported(raw) => raw,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One rule row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub source_module: ModuleCode,
    pub source_column: String,
    /// Set for CROSS_SHEET rules only.
    pub target_module: Option<ModuleCode>,
    pub target_column: String,
    pub operator: Operator,
    pub condition: Option<String>,
    pub severity: Severity,
    /// Message template; see [`Rule::render`].
    pub message: String,
    /// Name of the rule group (file stem) this row came from.
    pub group: String,
}

impl Rule {
    /// Fill `{value}`, `{source_column}`, `{target_column}`, `{target_module}`
    /// and `{condition}` in the message template.
    pub fn render(&self, value: &str) -> String {
        let template = if self.message.trim().is_empty() {
            self.default_message()
        } else {
            self.message.trim().to_string()
        };
        template
            .replace("{value}", value)
            .replace("{source_column}", &self.source_column)
            .replace("{target_column}", &self.target_column)
            .replace(
                "{target_module}",
                self.target_module.as_ref().map_or("", ModuleCode::as_str),
            )
            .replace("{condition}", self.condition.as_deref().unwrap_or(""))
    }

    fn default_message(&self) -> String {
        match self.kind {
            RuleKind::CrossCol => format!(
                "{} must be {} {}",
                self.source_column, self.operator, self.target_column
            ),
            RuleKind::Conditional => format!("{} is required", self.source_column),
            RuleKind::CrossSheet => format!("Unknown {} reference", self.source_column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(message: &str) -> Rule {
        Rule {
            kind: RuleKind::CrossSheet,
            source_module: ModuleCode::parse("b_05.01").unwrap(),
            source_column: "c0020".to_string(),
            target_module: Some(ModuleCode::parse("b_02.01").unwrap()),
            target_column: "c0010".to_string(),
            operator: Operator::Subset,
            condition: None,
            severity: Severity::Error,
            message: message.to_string(),
            group: "integrity".to_string(),
        }
    }

    #[test]
    fn render_fills_placeholders() {
        let rule = rule("{value} in {source_column} missing from {target_module}/{target_column}");
        assert_eq!(rule.render("P-9"), "P-9 in c0020 missing from b_02.01/c0010");
    }

    #[test]
    fn empty_template_uses_default() {
        assert_eq!(rule("  ").render("P-9"), "Unknown c0020 reference");
    }

    #[test]
    fn kind_aliases() {
        assert_eq!(RuleKind::parse("cross col"), Some(RuleKind::CrossCol));
        assert_eq!(RuleKind::parse("Cross-Sheet"), Some(RuleKind::CrossSheet));
        assert_eq!(RuleKind::parse("LOOKUP"), None);
    }

    #[test]
    fn operator_compare() {
        assert_eq!(Operator::parse("<=").compare(&1, &1), Some(true));
        assert_eq!(Operator::parse(">").compare(&1, &1), Some(false));
        assert_eq!(Operator::parse("required_if").compare(&1, &1), None);
        assert_eq!(Operator::parse("~="), Operator::Unsupported("~=".to_string()));
    }
}
