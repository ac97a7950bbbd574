//! Rust source output for generated type definitions.

use crate::naming;
use crate::source::WorkflowTypes;
use crate::types::{DefinitionBody, EnumMember, Field, TypeDefinition, TypeExpr};
use std::collections::{HashMap, HashSet};

const RECORD_DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";
const ENUM_DERIVES: &str = "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix the output with the `serde` import the derives need.
    pub imports: bool,
}

/// Renders definitions in order, separated by blank lines.
///
/// Union-typed fields have no inline Rust spelling, so each union is emitted
/// as an `#[serde(untagged)]` enum named after its record and field, placed
/// right before the record that uses it. A field that leads back to its own
/// record without passing through a `Vec` or map is boxed.
pub fn render_definitions(definitions: &[TypeDefinition], options: &RenderOptions) -> String {
    let mut renderer = Renderer {
        taken: definitions.iter().map(|d| d.name.clone()).collect(),
        inline: definitions
            .iter()
            .filter_map(|d| match &d.body {
                DefinitionBody::Record { fields } => {
                    let mut names = Vec::new();
                    for field in fields {
                        inline_names(&field.ty, &mut names);
                    }
                    Some((d.name.clone(), names))
                }
                DefinitionBody::Enum { .. } => None,
            })
            .collect(),
    };

    let mut blocks = Vec::with_capacity(definitions.len());
    for definition in definitions {
        match &definition.body {
            DefinitionBody::Record { fields } => {
                let mut hoisted = Vec::new();
                let record = renderer.record(definition, fields, &mut hoisted);
                blocks.extend(hoisted);
                blocks.push(record);
            }
            DefinitionBody::Enum { members } => blocks.push(render_enum(definition, members)),
        }
    }

    let body = blocks.join("\n\n");
    if options.imports {
        format!("use serde::{{Deserialize, Serialize}};\n\n{body}")
    } else {
        body
    }
}

/// Renders a workflow as a module holding `input` and `output` submodules, so
/// types synthesized for both sides cannot clash.
pub fn render_workflow(workflow: &WorkflowTypes) -> String {
    let mut sections = vec![submodule("input", &workflow.input)];
    if !workflow.output.is_empty() {
        sections.push(submodule("output", &workflow.output));
    }

    format!(
        "pub mod {} {{\n{}\n}}",
        naming::field_ident(&workflow.name),
        sections.join("\n\n")
    )
}

fn submodule(name: &str, definitions: &[TypeDefinition]) -> String {
    let body = render_definitions(definitions, &RenderOptions { imports: true });
    format!("    pub mod {} {{\n{}\n    }}", name, indent(&body, 8))
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct Renderer {
    taken: HashSet<String>,
    /// Record name to the names its fields hold by value.
    inline: HashMap<String, Vec<String>>,
}

impl Renderer {
    fn record(&mut self, definition: &TypeDefinition, fields: &[Field], hoisted: &mut Vec<String>) -> String {
        let mut output = String::new();
        push_doc(&mut output, "", definition.description.as_deref());
        output.push_str(RECORD_DERIVES);
        output.push('\n');
        output.push_str(&format!("pub struct {} {{\n", definition.name));

        let mut idents = HashSet::new();
        for field in fields {
            push_doc(&mut output, "    ", field.description.as_deref());
            if let Some(doc) = &field.doc {
                output.push_str(&format!("    /// {}\n", doc));
            }

            let ident = unique(naming::field_ident(&field.name), &mut idents);
            if ident.trim_start_matches("r#") != field.name {
                output.push_str(&format!("    #[serde(rename = {:?})]\n", field.name));
            }

            let union_name = format!("{}{}", definition.name, naming::pascal_case(&field.name));
            let ty = self.rust_type(&field.ty, Some(definition.name.as_str()), &union_name, hoisted);
            output.push_str(&format!("    pub {}: {},\n", ident, ty));
        }

        output.push('}');
        output
    }

    /// `owner` is the record holding this type by value, `None` once behind a
    /// heap indirection.
    fn rust_type(
        &mut self,
        ty: &TypeExpr,
        owner: Option<&str>,
        union_name: &str,
        hoisted: &mut Vec<String>,
    ) -> String {
        match ty {
            TypeExpr::Any => "serde_json::Value".to_string(),
            TypeExpr::String => "String".to_string(),
            TypeExpr::Integer => "i64".to_string(),
            TypeExpr::Float => "f64".to_string(),
            TypeExpr::Boolean => "bool".to_string(),
            TypeExpr::Null => "()".to_string(),
            TypeExpr::Timestamp => "chrono::DateTime<chrono::Utc>".to_string(),
            TypeExpr::Named(name) => match owner {
                Some(owner) if self.reaches(name, owner) => format!("Box<{name}>"),
                _ => name.clone(),
            },
            TypeExpr::Array(inner) => format!("Vec<{}>", self.rust_type(inner, None, union_name, hoisted)),
            TypeExpr::Map(inner) => format!(
                "std::collections::HashMap<String, {}>",
                self.rust_type(inner, None, union_name, hoisted)
            ),
            TypeExpr::Nilable(inner) => {
                format!("Option<{}>", self.rust_type(inner, owner, union_name, hoisted))
            }
            TypeExpr::Union(members) => self.union(members, owner, union_name, hoisted),
        }
    }

    fn union(
        &mut self,
        members: &[TypeExpr],
        owner: Option<&str>,
        base_name: &str,
        hoisted: &mut Vec<String>,
    ) -> String {
        let name = self.claim(base_name);
        let mut variant_names = HashSet::new();
        let mut variants = Vec::with_capacity(members.len());

        for member in members {
            let variant = unique(variant_name(member), &mut variant_names);
            let line = match member {
                TypeExpr::Null => format!("    {},\n", variant),
                other => {
                    let nested_name = format!("{}{}", name, variant);
                    let ty = self.rust_type(other, owner, &nested_name, hoisted);
                    format!("    {}({}),\n", variant, ty)
                }
            };
            variants.push(line);
        }

        let mut output = String::new();
        output.push_str(RECORD_DERIVES);
        output.push('\n');
        output.push_str("#[serde(untagged)]\n");
        output.push_str(&format!("pub enum {} {{\n", name));
        for variant in variants {
            output.push_str(&variant);
        }
        output.push('}');
        hoisted.push(output);

        name
    }

    /// True when `from` is `to` or holds it by value through other records.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(name) = stack.pop() {
            if name == to {
                return true;
            }
            if !seen.insert(name) {
                continue;
            }
            if let Some(names) = self.inline.get(name) {
                stack.extend(names.iter().map(String::as_str));
            }
        }
        false
    }

    /// Reserves a type name that does not clash with anything rendered so far.
    fn claim(&mut self, base: &str) -> String {
        let name = unique(base.to_string(), &mut self.taken);
        self.taken.insert(name.clone());
        name
    }
}

fn render_enum(definition: &TypeDefinition, members: &[EnumMember]) -> String {
    let mut output = String::new();
    push_doc(&mut output, "", definition.description.as_deref());
    output.push_str(ENUM_DERIVES);
    output.push('\n');
    output.push_str(&format!("pub enum {} {{\n", definition.name));
    for member in members {
        let literal = match &member.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        output.push_str(&format!("    #[serde(rename = {:?})]\n", literal));
        output.push_str(&format!("    {},\n", member.name));
    }
    output.push('}');
    output
}

/// Names a value of type `ty` stores without indirection.
fn inline_names(ty: &TypeExpr, out: &mut Vec<String>) {
    match ty {
        TypeExpr::Named(name) => out.push(name.clone()),
        TypeExpr::Nilable(inner) => inline_names(inner, out),
        TypeExpr::Union(members) => {
            for member in members {
                inline_names(member, out);
            }
        }
        _ => {}
    }
}

fn variant_name(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Any => "Value".to_string(),
        TypeExpr::String => "String".to_string(),
        TypeExpr::Integer => "Integer".to_string(),
        TypeExpr::Float => "Float".to_string(),
        TypeExpr::Boolean => "Boolean".to_string(),
        TypeExpr::Null => "Null".to_string(),
        TypeExpr::Timestamp => "Timestamp".to_string(),
        TypeExpr::Named(name) => name.clone(),
        TypeExpr::Array(inner) => format!("{}List", variant_name(inner)),
        TypeExpr::Map(inner) => format!("{}Map", variant_name(inner)),
        TypeExpr::Nilable(inner) => format!("Optional{}", variant_name(inner)),
        TypeExpr::Union(_) => "Union".to_string(),
    }
}

/// `base`, or `base` with the first free numeric suffix. Inserts the result into `taken`.
fn unique(base: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}{}", base, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn push_doc(output: &mut String, indent: &str, text: Option<&str>) {
    let Some(text) = text else { return };
    for line in text.lines() {
        if line.trim().is_empty() {
            output.push_str(&format!("{}///\n", indent));
        } else {
            output.push_str(&format!("{}/// {}\n", indent, line.trim_end()));
        }
    }
}
