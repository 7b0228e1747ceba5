//! Supertype hierarchy validation.
//!
//! Runs after class headers are resolved and before override resolution.
//! Produces the supertype-first order override resolution walks, and makes
//! that order well defined by cutting every inheritance loop it finds.

use jetc_binder::BinderState;
use jetc_common::{DiagnosticReporter, diagnostic_codes};
use jetc_descriptors::{DescriptorId, InternalError, JetType, Modality, TypeChecker};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Validates supertype lists and orders classes supertypes-first.
pub struct HierarchyChecker<'s, 'a> {
    state: &'s mut BinderState<'a>,
    marks: FxHashMap<DescriptorId, Mark>,
    stack: Vec<DescriptorId>,
    order: Vec<DescriptorId>,
    cyclic: FxHashSet<DescriptorId>,
}

impl<'s, 'a> HierarchyChecker<'s, 'a> {
    pub fn new(state: &'s mut BinderState<'a>) -> Self {
        Self {
            state,
            marks: FxHashMap::default(),
            stack: Vec::new(),
            order: Vec::new(),
            cyclic: FxHashSet::default(),
        }
    }

    /// Report bad supertype entries, break loops and return every class of
    /// the unit with its supertypes before it.
    pub fn check(self, reporter: &mut dyn DiagnosticReporter) -> Result<Vec<DescriptorId>, InternalError> {
        let classes = self.state.classes.clone();
        self.check_classes(&classes, reporter)
    }

    /// Same as `check` for `classes` only. Supertypes that are already
    /// locked count as ordered and are not returned again.
    #[tracing::instrument(level = "debug", skip_all, fields(classes = classes.len()))]
    pub fn check_classes(
        mut self,
        classes: &[DescriptorId],
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<Vec<DescriptorId>, InternalError> {
        for &class in classes {
            self.check_supertype_entries(class, reporter);
        }
        for &class in classes {
            if !self.marks.contains_key(&class) {
                self.visit(class, reporter)?;
            }
        }
        debug!(
            classes = self.order.len(),
            cyclic = self.cyclic.len(),
            "ordered class hierarchy"
        );
        Ok(self.order)
    }

    fn check_supertype_entries(&self, class: DescriptorId, reporter: &mut dyn DiagnosticReporter) {
        let Some(refs) = self.state.supertype_refs.get(&class) else {
            return;
        };
        let syntax = self.state.syntax();
        for supertype in refs {
            let written = syntax.type_ref_text(
                syntax
                    .supertype_entry(supertype.entry)
                    .map_or(supertype.entry, |entry| entry.type_ref),
            );
            let written = written.as_str();
            match &supertype.ty {
                JetType::TypeParameter { .. } => {
                    self.state.report_at(
                        reporter,
                        supertype.entry,
                        diagnostic_codes::SUPERTYPE_NOT_A_CLASS,
                        &[written],
                    );
                }
                JetType::Class { class: target, .. } => {
                    let is_final = self
                        .state
                        .descriptors
                        .class(*target)
                        .is_some_and(|data| data.modality == Modality::Final);
                    if is_final {
                        self.state.report_at(
                            reporter,
                            supertype.entry,
                            diagnostic_codes::FINAL_SUPERTYPE,
                            &[written],
                        );
                    }
                }
                JetType::Error => {}
            }
        }
    }

    /// Depth-first walk from `root`. Each frame holds a class on `stack`
    /// and the supertypes it still has to look at, so deep chains do not
    /// grow the call stack.
    fn visit(&mut self, root: DescriptorId, reporter: &mut dyn DiagnosticReporter) -> Result<(), InternalError> {
        let mut frames: Vec<(DescriptorId, SmallVec<[DescriptorId; 4]>)> = Vec::new();
        frames.push(self.enter(root));

        while let Some((class, pending)) = frames.last_mut() {
            let class = *class;
            let Some(supertype) = pending.pop() else {
                frames.pop();
                self.stack.pop();
                self.marks.insert(class, Mark::Done);
                self.order.push(class);
                continue;
            };
            match self.marks.get(&supertype) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => self.break_cycle(class, supertype, reporter)?,
                None if self.state.class_scopes.contains_key(&supertype)
                    && !self
                        .state
                        .descriptors
                        .class(supertype)
                        .is_some_and(|data| data.is_locked()) =>
                {
                    frames.push(self.enter(supertype));
                }
                // Builtins and other already-resolved classes.
                None => {
                    self.marks.insert(supertype, Mark::Done);
                }
            }
        }
        Ok(())
    }

    /// Put `class` on the stack. Its supertypes come back in reverse so
    /// popping them keeps declaration order.
    fn enter(&mut self, class: DescriptorId) -> (DescriptorId, SmallVec<[DescriptorId; 4]>) {
        self.marks.insert(class, Mark::Visiting);
        self.stack.push(class);
        let pending = self
            .state
            .descriptors
            .supertypes(class)
            .iter()
            .rev()
            .filter_map(JetType::class_id)
            .collect();
        (class, pending)
    }

    /// `class` reaches `target`, which is still on the stack.
    fn break_cycle(
        &mut self,
        class: DescriptorId,
        target: DescriptorId,
        reporter: &mut dyn DiagnosticReporter,
    ) -> Result<(), InternalError> {
        let start = self
            .stack
            .iter()
            .rposition(|&member| member == target)
            .unwrap_or(0);
        for &member in &self.stack[start..] {
            if self.cyclic.insert(member) {
                let name = self.state.text(self.state.descriptors.name(member));
                self.state.report_at(
                    reporter,
                    self.state.descriptors.source(member),
                    diagnostic_codes::CYCLIC_INHERITANCE_HIERARCHY,
                    &[name],
                );
            }
        }
        debug!(class = class.0, supertype = target.0, "removing cyclic supertype");
        self.state
            .descriptors
            .class_mut(class)?
            .remove_supertype(class, target)
    }
}

/// Whether `class` inherits from `ancestor` through resolved supertypes.
pub fn is_subclass_of(checker: &TypeChecker<'_>, class: DescriptorId, ancestor: DescriptorId) -> bool {
    checker
        .find_supertype_instance(&JetType::class(class), ancestor)
        .is_some()
}
