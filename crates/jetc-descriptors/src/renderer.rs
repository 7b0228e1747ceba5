//! Kotlin-like rendering of descriptors and types for diagnostics.

use jetc_common::Interner;

use crate::descriptor::{DescriptorData, DescriptorId};
use crate::types::JetType;
use crate::DescriptorArena;

pub struct DescriptorRenderer<'a> {
    arena: &'a DescriptorArena,
    interner: &'a Interner,
}

impl<'a> DescriptorRenderer<'a> {
    pub fn new(arena: &'a DescriptorArena, interner: &'a Interner) -> Self {
        DescriptorRenderer { arena, interner }
    }

    fn name(&self, id: DescriptorId) -> &'a str {
        self.interner.resolve(self.arena.name(id))
    }

    pub fn render_type(&self, ty: &JetType) -> String {
        match ty {
            JetType::Class {
                class,
                arguments,
                nullable,
            } => {
                let mut text = self.name(*class).to_string();
                if !arguments.is_empty() {
                    let args: Vec<String> = arguments.iter().map(|a| self.render_type(a)).collect();
                    text.push('<');
                    text.push_str(&args.join(", "));
                    text.push('>');
                }
                if *nullable {
                    text.push('?');
                }
                text
            }
            JetType::TypeParameter {
                parameter,
                nullable,
            } => {
                let mut text = self.name(*parameter).to_string();
                if *nullable {
                    text.push('?');
                }
                text
            }
            JetType::Error => String::from("[ERROR]"),
        }
    }

    /// `Outer.Inner.member`, skipping modules.
    pub fn render_qualified_name(&self, id: DescriptorId) -> String {
        let mut parts = vec![self.name(id)];
        let mut current = self.arena.containing(id);
        while let Some(parent) = current {
            if matches!(
                self.arena.get(parent).map(|d| &d.data),
                Some(DescriptorData::Module) | None
            ) {
                break;
            }
            parts.push(self.name(parent));
            current = self.arena.containing(parent);
        }
        parts.reverse();
        parts.join(".")
    }

    fn render_type_parameters(&self, parameters: &[DescriptorId]) -> String {
        if parameters.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = parameters.iter().map(|&p| self.render(p)).collect();
        format!("<{}>", rendered.join(", "))
    }

    fn render_value_parameters(&self, parameters: &[DescriptorId]) -> String {
        let rendered: Vec<String> = parameters.iter().map(|&p| self.render(p)).collect();
        format!("({})", rendered.join(", "))
    }

    pub fn render(&self, id: DescriptorId) -> String {
        let Some(descriptor) = self.arena.get(id) else {
            return String::from("<unknown>");
        };
        let name = self.name(id);
        match &descriptor.data {
            DescriptorData::Module => format!("module {name}"),
            DescriptorData::Class(data) => {
                let mut text = format!(
                    "{} {name}{}",
                    data.kind.keyword(),
                    self.render_type_parameters(data.type_parameters())
                );
                if !data.supertypes().is_empty() {
                    let supertypes: Vec<String> = data
                        .supertypes()
                        .iter()
                        .map(|ty| self.render_type(ty))
                        .collect();
                    text.push_str(" : ");
                    text.push_str(&supertypes.join(", "));
                }
                text
            }
            DescriptorData::Function(data) => {
                let mut text = String::from("fun ");
                let type_parameters = self.render_type_parameters(&data.type_parameters);
                if !type_parameters.is_empty() {
                    text.push_str(&type_parameters);
                    text.push(' ');
                }
                if let Some(receiver) = &data.extension_receiver {
                    text.push_str(&self.render_type(receiver));
                    text.push('.');
                }
                text.push_str(name);
                text.push_str(&self.render_value_parameters(&data.value_parameters));
                text.push_str(": ");
                text.push_str(&self.render_type(&data.return_type));
                text
            }
            DescriptorData::Property(data) => {
                let mut text = String::from(if data.is_var { "var " } else { "val " });
                if let Some(receiver) = &data.callable.extension_receiver {
                    text.push_str(&self.render_type(receiver));
                    text.push('.');
                }
                text.push_str(name);
                text.push_str(": ");
                text.push_str(&self.render_type(&data.callable.return_type));
                text
            }
            DescriptorData::Constructor(data) => {
                let owner = descriptor.containing.map_or("", |c| self.name(c));
                format!(
                    "constructor {owner}{}",
                    self.render_value_parameters(&data.value_parameters)
                )
            }
            DescriptorData::Accessor(data) => {
                let property = descriptor
                    .containing
                    .map(|p| self.name(p))
                    .unwrap_or_default();
                let prefix = if data.is_getter { "get" } else { "set" };
                format!("<{prefix}-{property}>")
            }
            DescriptorData::ValueParameter(data) => {
                let vararg = if data.is_vararg { "vararg " } else { "" };
                format!("{vararg}{name}: {}", self.render_type(&data.ty))
            }
            DescriptorData::TypeParameter(data) => match data.upper_bounds.as_slice() {
                [] => name.to_string(),
                bounds => {
                    let rendered: Vec<String> = bounds.iter().map(|b| self.render_type(b)).collect();
                    format!("{name} : {}", rendered.join(", "))
                }
            },
            DescriptorData::LocalVariable(data) => {
                let keyword = if data.is_var { "var" } else { "val" };
                format!("{keyword} {name}: {}", self.render_type(&data.ty))
            }
        }
    }
}
