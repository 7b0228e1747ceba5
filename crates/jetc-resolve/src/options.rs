//! Analyzer configuration.

use jetc_binder::BinderOptions;
use serde::{Deserialize, Serialize};

/// Options for one `TopDownAnalyzer::analyze` run.
///
/// Deserialized from camelCase JSON; every missing key keeps its default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerOptions {
    /// Report `REDECLARATION` for names declared twice in one scope.
    pub report_redeclarations: bool,
    /// Report `NOTHING_TO_OVERRIDE`, `VIRTUAL_MEMBER_HIDDEN` and the other
    /// declared-member override checks.
    pub report_override_modifier_errors: bool,
    /// Report `ABSTRACT_MEMBER_NOT_IMPLEMENTED` on concrete classes.
    pub report_abstract_not_implemented: bool,
    /// Give classes without explicit supertypes `Any`.
    pub implicit_any_supertype: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions {
            report_redeclarations: true,
            report_override_modifier_errors: true,
            report_abstract_not_implemented: true,
            implicit_any_supertype: true,
        }
    }
}

impl AnalyzerOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The subset the binder phases read.
    pub fn to_binder_options(&self) -> BinderOptions {
        BinderOptions {
            report_redeclarations: self.report_redeclarations,
            implicit_any_supertype: self.implicit_any_supertype,
        }
    }
}
