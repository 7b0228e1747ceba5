//! Type reference resolution.

use jetc_common::{DiagnosticReporter, diagnostic_codes};
use jetc_descriptors::{DescriptorData, JetType};
use jetc_syntax::NodeIndex;
use tracing::trace;

use crate::scope::ScopeId;
use crate::state::BinderState;

impl BinderState<'_> {
    /// Resolve a `TypeReference` node in `scope`.
    ///
    /// Unresolved names become the error type after an
    /// `UNRESOLVED_REFERENCE` diagnostic. A missing node is the error type
    /// with no diagnostic; callers pick their own default first.
    pub fn resolve_type(
        &self,
        scope: ScopeId,
        type_ref: NodeIndex,
        reporter: &mut dyn DiagnosticReporter,
    ) -> JetType {
        let Some(data) = self.syntax.type_reference(type_ref) else {
            return JetType::Error;
        };
        let Some(classifier) = self.scopes.get_classifier(scope, data.name) else {
            trace!(name = self.text(data.name), scope = scope.0, "unresolved type");
            self.report_at(
                reporter,
                type_ref,
                diagnostic_codes::UNRESOLVED_REFERENCE,
                &[self.text(data.name)],
            );
            return JetType::Error;
        };
        let ty = match self.descriptors.get(classifier).map(|d| &d.data) {
            Some(DescriptorData::Class(_)) => {
                let arguments = data
                    .arguments
                    .iter()
                    .map(|&argument| self.resolve_type(scope, argument, reporter))
                    .collect();
                JetType::generic(classifier, arguments)
            }
            Some(DescriptorData::TypeParameter(_)) => JetType::type_parameter(classifier),
            _ => return JetType::Error,
        };
        ty.with_nullability(data.nullable)
    }

    /// Resolve an optional type reference, falling back to `default` when
    /// none is written.
    pub fn resolve_type_or(
        &self,
        scope: ScopeId,
        type_ref: NodeIndex,
        default: JetType,
        reporter: &mut dyn DiagnosticReporter,
    ) -> JetType {
        if type_ref.is_none() {
            return default;
        }
        self.resolve_type(scope, type_ref, reporter)
    }
}
