use tracing::debug;

use crate::schema2model::merge_enum_values;
use crate::{CompileError, Schema, SchemaCompiler, SchemaKind, SchemaNode, add_property};

impl SchemaCompiler {
    /// Folds `allOf` members into one record.
    ///
    /// Referenced members are embedded by name and contribute their riding
    /// fields; inline members contribute their fields. A field declared twice
    /// must be equivalent both times.
    pub fn merge_schemas(
        &self,
        all_of: &[Schema],
        path: &[String],
    ) -> Result<SchemaNode, CompileError> {
        let mut properties = Vec::new();
        let mut embedded: Vec<String> = Vec::new();
        let mut open_properties: Option<Box<SchemaNode>> = None;
        let mut enum_values = Vec::new();
        let mut auxiliary_types = Vec::new();

        for member in all_of {
            let mut compiled = self.compile(member, path)?;
            auxiliary_types.append(&mut compiled.auxiliary_types);
            merge_enum_values(&mut enum_values, std::mem::take(&mut compiled.enum_values));

            match compiled.kind {
                SchemaKind::Reference {
                    name,
                    properties: riding,
                } => {
                    if !embedded.contains(&name) {
                        embedded.push(name);
                    }
                    for property in riding {
                        add_property(&mut properties, property)?;
                    }
                }
                SchemaKind::Object {
                    properties: declared,
                    embedded: nested,
                    open_properties: open,
                } => {
                    for property in declared {
                        add_property(&mut properties, property)?;
                    }
                    for name in nested {
                        if !embedded.contains(&name) {
                            embedded.push(name);
                        }
                    }
                    if open_properties.is_none() {
                        open_properties = open;
                    } else if let (Some(first), Some(later)) = (&open_properties, &open) {
                        if first.type_decl() != later.type_decl() {
                            debug!(
                                kept = %first.type_decl(),
                                dropped = %later.type_decl(),
                                "conflicting additional properties in allOf, keeping the first"
                            );
                        }
                    }
                }
                other => {
                    debug!(path = ?path, member = ?other, "allOf member contributes no fields");
                }
            }
        }

        let mut merged = SchemaNode::new(SchemaKind::Object {
            properties,
            embedded,
            open_properties,
        });
        merged.enum_values = enum_values;
        merged.auxiliary_types = auxiliary_types;
        Ok(merged)
    }
}
