use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

use crate::ordering::sorted_keys;
use crate::schema::EXT_GO_TYPE;
use crate::{
    CompileError, CompilerConfig, Components, Document, EnumDefinition, EnumExtractor, EnumValue,
    Error, NameFormatter, Parameter, PrimitiveType, PropertyDescriptor, ReferenceResolver, Schema,
    SchemaKind, SchemaNode, TypeDefinition, ANY_MAP_TYPE, ANY_TYPE, STRING_TYPE, add_property,
    add_type_def, collect_enum_definitions, resolve_primitive,
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Everything the renderer needs for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeModel {
    pub definitions: Vec<TypeDefinition>,
    /// Promoted nested types reachable from `definitions`, each name once.
    pub auxiliary: Vec<TypeDefinition>,
}

impl TypeModel {
    pub fn enum_definitions(&self) -> Vec<EnumDefinition> {
        let mut defs = self.definitions.clone();
        defs.extend(self.auxiliary.iter().cloned());
        collect_enum_definitions(&defs)
    }
}

/// Compiles schema nodes into [`SchemaNode`] trees.
///
/// Holds only immutable configuration; compilations never share state.
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    config: CompilerConfig,
    names: NameFormatter,
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl SchemaCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        let names = NameFormatter::new(&config);
        Self { config, names }
    }

    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(&self.config.import_mapping, &self.names)
    }

    pub fn compile_file(&self, input_path: &Path) -> Result<TypeModel, Error> {
        let content = std::fs::read_to_string(input_path)?;
        let document: Document = serde_json::from_str(&content)?;
        Ok(self.compile_document(&document)?)
    }

    pub fn compile_document(&self, document: &Document) -> Result<TypeModel, CompileError> {
        let definitions = match &document.components {
            Some(components) => self.compile_components(components)?,
            None => Vec::new(),
        };

        let mut auxiliary: Vec<TypeDefinition> = Vec::new();
        for def in &definitions {
            let at_definition = |err: CompileError| err.at_path(&[def.source_name.clone()]);
            for aux in def.schema.additional_type_defs().map_err(at_definition)? {
                if definitions.iter().any(|d| d.name == aux.name) {
                    return Err(at_definition(CompileError::TypeNameConflict(aux.name)));
                }
                add_type_def(&mut auxiliary, aux).map_err(at_definition)?;
            }
        }

        debug!(
            definitions = definitions.len(),
            auxiliary = auxiliary.len(),
            "compiled document"
        );
        Ok(TypeModel {
            definitions,
            auxiliary,
        })
    }

    /// Named types for every component, in canonical key order per section.
    pub fn compile_components(
        &self,
        components: &Components,
    ) -> Result<Vec<TypeDefinition>, CompileError> {
        let mut defs = Vec::new();

        for name in sorted_keys(components.schemas.keys()) {
            let schema = &components.schemas[name];
            let node = self.compile(schema, &[name.clone()])?;
            defs.push(TypeDefinition::new(
                &self.names.identifier_type_name(name),
                name,
                node,
            ));
        }

        for name in sorted_keys(components.parameters.keys()) {
            let parameter = &components.parameters[name];
            let node = self.compile_parameter(parameter, &[name.clone()])?;
            defs.push(TypeDefinition::new(
                &format!("{}Parameter", self.names.identifier_type_name(name)),
                name,
                node,
            ));
        }

        for name in sorted_keys(components.request_bodies.keys()) {
            let body = &components.request_bodies[name];
            if let Some(schema) = body
                .content
                .get(JSON_CONTENT_TYPE)
                .and_then(|media| media.schema.as_ref())
            {
                let node = self.compile(schema, &[name.clone()])?;
                defs.push(TypeDefinition::new(
                    &format!("{}RequestBody", self.names.identifier_type_name(name)),
                    name,
                    node,
                ));
            }
        }

        for name in sorted_keys(components.responses.keys()) {
            let response = &components.responses[name];
            if let Some(schema) = response
                .content
                .get(JSON_CONTENT_TYPE)
                .and_then(|media| media.schema.as_ref())
            {
                let node = self.compile(schema, &[name.clone()])?;
                defs.push(TypeDefinition::new(
                    &format!("{}Response", self.names.identifier_type_name(name)),
                    name,
                    node,
                ));
            }
        }

        Ok(defs)
    }

    /// A parameter's type comes from its schema, or failing that from its
    /// content: JSON content is compiled, anything else stays a string.
    pub fn compile_parameter(
        &self,
        parameter: &Parameter,
        path: &[String],
    ) -> Result<SchemaNode, CompileError> {
        let description = parameter.description.as_deref().unwrap_or_default();

        if let Some(schema) = &parameter.schema {
            return self.compile(schema, path);
        }
        if parameter.content.is_empty() {
            return Err(
                CompileError::MissingSchemaOrContent(parameter.name.clone()).at_path(path)
            );
        }
        if parameter.content.len() > 1 {
            return Ok(SchemaNode::primitive(STRING_TYPE).with_description(description));
        }

        match parameter.content.get(JSON_CONTENT_TYPE) {
            Some(media) => self.compile_optional(media.schema.as_ref(), path),
            None => Ok(SchemaNode::primitive(STRING_TYPE).with_description(description)),
        }
    }

    /// An absent schema, e.g. array items that were never declared, is dynamic.
    pub fn compile_optional(
        &self,
        schema: Option<&Schema>,
        path: &[String],
    ) -> Result<SchemaNode, CompileError> {
        match schema {
            Some(schema) => self.compile(schema, path),
            None => Ok(SchemaNode::dynamic(ANY_TYPE)),
        }
    }

    /// Compiles `schema`, reached through the property names in `path`.
    pub fn compile(&self, schema: &Schema, path: &[String]) -> Result<SchemaNode, CompileError> {
        self.compile_schema(schema, path)
            .map_err(|err| err.at_path(path))
    }

    fn compile_schema(&self, schema: &Schema, path: &[String]) -> Result<SchemaNode, CompileError> {
        let description = schema.description.as_deref().unwrap_or_default();

        if let Some(ref_path) = schema.reference() {
            return self.compile_reference(ref_path, schema, path);
        }

        // Alternatives can't be modelled as one record.
        if !schema.any_of.is_empty() || !schema.one_of.is_empty() {
            debug!(path = ?path, "anyOf/oneOf compiled as dynamic");
            return Ok(SchemaNode::dynamic(ANY_TYPE).with_description(description));
        }

        if !schema.all_of.is_empty() {
            let merged = self.merge_schemas(&schema.all_of, path)?;
            return Ok(merged.with_description(description));
        }

        if let Some(extension) = schema.extension(EXT_GO_TYPE) {
            let type_name = extension.as_str().ok_or_else(|| CompileError::InvalidExtension {
                key: EXT_GO_TYPE.to_string(),
                message: format!("expected a type name string, got {}", extension),
            })?;
            return Ok(SchemaNode::reference(type_name).with_description(description));
        }

        match schema.type_.as_deref() {
            None | Some("") | Some("object") => self.compile_object(schema, path, description),
            Some(_) if !schema.enum_values.is_empty() => {
                self.compile_enum(schema, path, description)
            }
            Some(_) => self.resolve_type(schema, path, description),
        }
    }

    fn compile_reference(
        &self,
        ref_path: &str,
        schema: &Schema,
        path: &[String],
    ) -> Result<SchemaNode, CompileError> {
        let name = self.resolver().resolve(ref_path)?;
        debug!(reference = ref_path, type_name = %name, "resolved reference");

        let mut properties = Vec::new();
        let mut enum_values = Vec::new();
        for composed in std::iter::once(schema).chain(schema.all_of.iter()) {
            for property in self.compile_properties(composed, path)? {
                add_property(&mut properties, property)?;
            }
            merge_enum_values(&mut enum_values, self.enum_values(composed, path));
        }

        let mut node = SchemaNode::new(SchemaKind::Reference { name, properties });
        node.enum_values = enum_values;
        node.description = schema.description.clone().unwrap_or_default();
        Ok(node)
    }

    fn compile_object(
        &self,
        schema: &Schema,
        path: &[String],
        description: &str,
    ) -> Result<SchemaNode, CompileError> {
        if schema.properties.is_empty() && !schema.has_additional_properties() {
            let declared_type = if schema.type_.as_deref() == Some("object") {
                ANY_MAP_TYPE
            } else {
                ANY_TYPE
            };
            return Ok(SchemaNode::dynamic(declared_type).with_description(description));
        }

        let properties = self.compile_properties(schema, path)?;
        let open_properties = self.compile_open_properties(schema, path)?;

        let node = SchemaNode::new(SchemaKind::Object {
            properties,
            embedded: Vec::new(),
            open_properties,
        });
        Ok(node.with_description(description))
    }

    /// Compiles declared properties in canonical order. Nested shapes with
    /// open properties are promoted to named types.
    pub(crate) fn compile_properties(
        &self,
        schema: &Schema,
        path: &[String],
    ) -> Result<Vec<PropertyDescriptor>, CompileError> {
        let mut properties = Vec::with_capacity(schema.properties.len());

        for name in sorted_keys(schema.properties.keys()) {
            let property_schema = &schema.properties[name];
            let mut property_path = path.to_vec();
            property_path.push(name.clone());

            let mut compiled = self.compile(property_schema, &property_path)?;
            if compiled.has_open_properties() && !compiled.is_ref() {
                compiled = self.promote(compiled, &property_path);
            }
            trace!(property = %name, type_decl = %compiled.type_decl(), "compiled property");

            let mut property = PropertyDescriptor::new(
                name,
                &self.names.schema_name_to_type_name(name),
                compiled,
            );
            property.description = property_schema.description.clone().unwrap_or_default();
            property.required = schema.is_required(name);
            property.nullable = property_schema.nullable;
            property.read_only = property_schema.read_only;
            property.write_only = property_schema.write_only;
            property.extensions = property_schema.vendor_extensions();
            properties.push(property);
        }

        Ok(properties)
    }

    fn compile_open_properties(
        &self,
        schema: &Schema,
        path: &[String],
    ) -> Result<Option<Box<SchemaNode>>, CompileError> {
        if !schema.has_additional_properties() {
            return Ok(None);
        }
        let element = match schema.additional_properties_schema() {
            Some(extra) => self.compile(extra, path)?,
            None => SchemaNode::dynamic(ANY_TYPE),
        };
        Ok(Some(Box::new(element)))
    }

    /// Moves an anonymous nested shape into a named type and refers to it.
    fn promote(&self, node: SchemaNode, path: &[String]) -> SchemaNode {
        let type_name = self
            .names
            .sanitize_identifier(&self.names.path_to_type_name(path));
        debug!(type_name = %type_name, "promoting nested type");

        let mut reference = SchemaNode::reference(&type_name).with_description(&node.description);
        reference
            .auxiliary_types
            .push(TypeDefinition::new(&type_name, &path.join("."), node));
        reference
    }

    fn compile_enum(
        &self,
        schema: &Schema,
        path: &[String],
        description: &str,
    ) -> Result<SchemaNode, CompileError> {
        let mut node = self.resolve_type(schema, path, description)?;
        node.enum_values = self.enum_values(schema, path);

        // Top-level enums are named by their definition already.
        if path.len() > 1 {
            let type_name = self
                .names
                .schema_name_to_type_name(&self.names.path_to_type_name(path));
            debug!(type_name = %type_name, "promoting nested enum");

            let mut reference =
                SchemaNode::reference(&type_name).with_description(&node.description);
            reference
                .auxiliary_types
                .push(TypeDefinition::new(&type_name, &path.join("."), node));
            return Ok(reference);
        }

        Ok(node)
    }

    /// Enum constants of `schema`, qualified by the path that names the enum.
    fn enum_values(&self, schema: &Schema, path: &[String]) -> Vec<EnumValue> {
        if schema.enum_values.is_empty() {
            return Vec::new();
        }

        EnumExtractor::new(&self.names)
            .extract(&schema.enum_literals())
            .into_iter()
            .map(|value| {
                let mut constant_path = path.to_vec();
                constant_path.push(value.name);
                let name = self
                    .names
                    .schema_name_to_enum_value_name(&self.names.path_to_type_name(&constant_path));
                EnumValue::new(&name, &value.value)
            })
            .collect()
    }

    /// Scalars map directly; arrays recurse into their items and lift the
    /// items' auxiliary types.
    fn resolve_type(
        &self,
        schema: &Schema,
        path: &[String],
        description: &str,
    ) -> Result<SchemaNode, CompileError> {
        let kind = schema.type_.as_deref().unwrap_or_default();

        match resolve_primitive(schema.format.as_deref(), kind)? {
            PrimitiveType::Array => {
                let mut element = self.compile_optional(schema.items.as_deref(), path)?;
                let auxiliary_types = std::mem::take(&mut element.auxiliary_types);
                let mut node = SchemaNode::array(element).with_description(description);
                node.auxiliary_types = auxiliary_types;
                Ok(node)
            }
            PrimitiveType::Scalar(scalar) => {
                Ok(SchemaNode::primitive(scalar).with_description(description))
            }
        }
    }
}

/// Appends enum constants whose names are not present yet.
pub(crate) fn merge_enum_values(into: &mut Vec<EnumValue>, values: Vec<EnumValue>) {
    for value in values {
        if !into.iter().any(|existing| existing.name == value.name) {
            into.push(value);
        }
    }
}
