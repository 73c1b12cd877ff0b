//! Module classification from a table label.

use std::sync::LazyLock;

use regex::Regex;
use roi_model::ModuleCode;

/// `b_NN.NN` anywhere in the label, any case. Digits are ASCII only.
static MODULE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)b_[0-9]{2}\.[0-9]{2}").expect("Invalid module tag regex")
});

/// Module code tagged in `label`, lower-cased. The first tag wins.
///
/// ```
/// use roi_ingest::detect_module;
///
/// let code = detect_module("export_B_05.01_2024.csv").unwrap();
/// assert_eq!(code.as_str(), "b_05.01");
/// assert!(detect_module("providers.csv").is_none());
/// ```
pub fn detect_module(label: &str) -> Option<ModuleCode> {
    let found = MODULE_TAG.find(label)?;
    ModuleCode::parse(found.as_str()).ok()
}
