use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ordering::sorted_keys;
use crate::schema::{EXT_EXTRA_TAGS, EXT_GO_NAME, EXT_OMIT_EMPTY};
use crate::{CompileError, RAW_JSON_TYPE};

pub const ANY_TYPE: &str = "interface{}";
pub const ANY_MAP_TYPE: &str = "map[string]interface{}";

pub type Extensions = BTreeMap<String, Value>;

/// One resolved schema shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    /// Constant name -> serialized literal, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValue>,
    /// Promoted nested types that have to be emitted with this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auxiliary_types: Vec<TypeDefinition>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Rendered without an optional indirection even when not required.
    #[serde(default)]
    pub skip_optional_pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaKind {
    Primitive {
        declared_type: String,
    },
    Array {
        element: Box<SchemaNode>,
    },
    Object {
        properties: Vec<PropertyDescriptor>,
        /// Named types composed into this record.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        embedded: Vec<String>,
        /// Present iff undeclared fields are permitted; holds their type.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        open_properties: Option<Box<SchemaNode>>,
    },
    Reference {
        name: String,
        /// Fields declared next to the reference itself.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        properties: Vec<PropertyDescriptor>,
    },
    Dynamic {
        declared_type: String,
    },
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            enum_values: Vec::new(),
            auxiliary_types: Vec::new(),
            description: String::new(),
            skip_optional_pointer: false,
        }
    }

    pub fn primitive(declared_type: &str) -> Self {
        let mut node = Self::new(SchemaKind::Primitive {
            declared_type: declared_type.to_string(),
        });
        node.skip_optional_pointer = declared_type == RAW_JSON_TYPE;
        node
    }

    pub fn dynamic(declared_type: &str) -> Self {
        Self::new(SchemaKind::Dynamic {
            declared_type: declared_type.to_string(),
        })
    }

    pub fn reference(name: &str) -> Self {
        Self::new(SchemaKind::Reference {
            name: name.to_string(),
            properties: Vec::new(),
        })
    }

    pub fn array(element: SchemaNode) -> Self {
        Self::new(SchemaKind::Array {
            element: Box::new(element),
        })
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.kind, SchemaKind::Reference { .. })
    }

    pub fn reference_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Reference { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn has_open_properties(&self) -> bool {
        matches!(
            self.kind,
            SchemaKind::Object {
                open_properties: Some(_),
                ..
            }
        )
    }

    /// Declared fields of objects and of references with riding fields.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        match &self.kind {
            SchemaKind::Object { properties, .. } | SchemaKind::Reference { properties, .. } => {
                properties
            }
            _ => &[],
        }
    }

    /// The type expression the renderer emits for this node.
    pub fn type_decl(&self) -> String {
        match &self.kind {
            SchemaKind::Primitive { declared_type } | SchemaKind::Dynamic { declared_type } => {
                declared_type.clone()
            }
            SchemaKind::Reference { name, .. } => name.clone(),
            SchemaKind::Array { element } => format!("[]{}", element.type_decl()),
            SchemaKind::Object {
                properties,
                embedded,
                open_properties,
            } => render_struct(properties, embedded, open_properties.as_deref()),
        }
    }

    /// Every auxiliary type reachable from this node, depth first, each name once.
    ///
    /// Fails when one name was generated for two different shapes.
    pub fn additional_type_defs(&self) -> Result<Vec<TypeDefinition>, CompileError> {
        let mut defs = Vec::new();
        self.collect_type_defs(&mut defs)?;
        Ok(defs)
    }

    fn collect_type_defs(&self, defs: &mut Vec<TypeDefinition>) -> Result<(), CompileError> {
        match &self.kind {
            SchemaKind::Object {
                properties,
                open_properties,
                ..
            } => {
                for property in properties {
                    property.schema.collect_type_defs(defs)?;
                }
                if let Some(open) = open_properties {
                    open.collect_type_defs(defs)?;
                }
            }
            SchemaKind::Reference { properties, .. } => {
                for property in properties {
                    property.schema.collect_type_defs(defs)?;
                }
            }
            SchemaKind::Array { element } => element.collect_type_defs(defs)?,
            SchemaKind::Primitive { .. } | SchemaKind::Dynamic { .. } => {}
        }

        for def in &self.auxiliary_types {
            def.schema.collect_type_defs(defs)?;
            add_type_def(defs, def.clone())?;
        }
        Ok(())
    }
}

/// Appends `def` unless an identical definition is present; a different
/// definition under the same name is a conflict.
pub fn add_type_def(
    defs: &mut Vec<TypeDefinition>,
    def: TypeDefinition,
) -> Result<(), CompileError> {
    match defs.iter().find(|d| d.name == def.name) {
        Some(existing) if *existing == def => Ok(()),
        Some(existing) => Err(CompileError::TypeNameConflict(existing.name.clone())),
        None => {
            defs.push(def);
            Ok(())
        }
    }
}

/// Appends `property`, tolerating an equivalent duplicate and rejecting a
/// conflicting one.
pub fn add_property(
    properties: &mut Vec<PropertyDescriptor>,
    property: PropertyDescriptor,
) -> Result<(), CompileError> {
    match properties
        .iter()
        .find(|p| p.source_name == property.source_name)
    {
        Some(existing) if existing.is_equivalent(&property) => Ok(()),
        Some(existing) => Err(CompileError::PropertyConflict(existing.source_name.clone())),
        None => {
            properties.push(property);
            Ok(())
        }
    }
}

fn render_struct(
    properties: &[PropertyDescriptor],
    embedded: &[String],
    open_properties: Option<&SchemaNode>,
) -> String {
    let mut parts = vec!["struct {".to_string()];

    if !embedded.is_empty() {
        parts.push("    // Embedded by composition".to_string());
        parts.extend(embedded.iter().map(|name| format!("    {}", name)));
    }

    for (i, property) in properties.iter().enumerate() {
        let mut field = String::new();
        let comment = to_doc_comment(&property.description);
        if !comment.is_empty() {
            if i != 0 {
                field.push('\n');
            }
            field.push_str(&comment);
            field.push('\n');
        }
        field.push_str(&format!(
            "    {} {} `{}`",
            property.go_field_name(),
            property.type_def(),
            property.tags()
        ));
        parts.push(field);
    }

    if let Some(open) = open_properties {
        parts.push(format!(
            "AdditionalProperties map[string]{} `json:\"-\"`",
            open.type_decl()
        ));
    }

    parts.push("}".to_string());
    parts.join("\n")
}

/// One field of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Serialized field name.
    pub source_name: String,
    /// Identifier derived from `source_name`.
    pub field_name: String,
    pub schema: SchemaNode,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    pub nullable: bool,
    pub read_only: bool,
    pub write_only: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: Extensions,
}

impl PropertyDescriptor {
    pub fn new(source_name: &str, field_name: &str, schema: SchemaNode) -> Self {
        Self {
            source_name: source_name.to_string(),
            field_name: field_name.to_string(),
            description: schema.description.clone(),
            schema,
            required: false,
            nullable: false,
            read_only: false,
            write_only: false,
            extensions: Extensions::new(),
        }
    }

    /// Same serialized name, same requiredness and same rendered type.
    pub fn is_equivalent(&self, other: &PropertyDescriptor) -> bool {
        self.source_name == other.source_name
            && self.required == other.required
            && self.schema.type_decl() == other.schema.type_decl()
    }

    /// The field name, unless `x-go-name` overrides it.
    pub fn go_field_name(&self) -> String {
        match self.extensions.get(EXT_GO_NAME) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                tracing::warn!(property = %self.source_name, value = %other, "ignoring non-string {}", EXT_GO_NAME);
                self.field_name.clone()
            }
            None => self.field_name.clone(),
        }
    }

    /// Field type, behind a pointer when the value may be absent.
    pub fn type_def(&self) -> String {
        let type_decl = self.schema.type_decl();
        if !self.schema.skip_optional_pointer
            && (!self.required || self.nullable || self.read_only || self.write_only)
        {
            format!("*{}", type_decl)
        } else {
            type_decl
        }
    }

    fn omit_empty(&self) -> bool {
        match self.extensions.get(EXT_OMIT_EMPTY) {
            Some(Value::Bool(omit)) => *omit,
            Some(other) => {
                tracing::warn!(property = %self.source_name, value = %other, "ignoring non-boolean {}", EXT_OMIT_EMPTY);
                true
            }
            None => true,
        }
    }

    fn extra_tags(&self) -> BTreeMap<String, String> {
        match self.extensions.get(EXT_EXTRA_TAGS) {
            Some(Value::Object(tags)) => tags
                .iter()
                .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
                .collect(),
            Some(other) => {
                tracing::warn!(property = %self.source_name, value = %other, "ignoring malformed {}", EXT_EXTRA_TAGS);
                BTreeMap::new()
            }
            None => BTreeMap::new(),
        }
    }

    /// Serialization tags, e.g. `json:"name,omitempty" validate:"required"`.
    pub fn tags(&self) -> String {
        let mut tags = BTreeMap::new();
        let json = if (self.required && !self.read_only && !self.write_only)
            || self.nullable
            || !self.omit_empty()
        {
            self.source_name.clone()
        } else {
            format!("{},omitempty", self.source_name)
        };
        tags.insert("json".to_string(), json);
        tags.extend(self.extra_tags());

        sorted_keys(tags.keys())
            .into_iter()
            .map(|key| format!("{}:\"{}\"", key, tags[key]))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A named type: a top-level component or a promoted nested shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    /// Dotted path of the schema in the document.
    pub source_name: String,
    pub schema: SchemaNode,
}

impl TypeDefinition {
    pub fn new(name: &str, source_name: &str, schema: SchemaNode) -> Self {
        Self {
            name: name.to_string(),
            source_name: source_name.to_string(),
            schema,
        }
    }

    /// True when the definition can be emitted as an alias of another type.
    pub fn can_alias(&self) -> bool {
        match &self.schema.kind {
            SchemaKind::Reference { .. } => true,
            SchemaKind::Array { element } => element.is_ref(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: String,
}

impl EnumValue {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Constants of one enum type, as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub type_name: String,
    pub schema: SchemaNode,
    /// Quote wrapped around each literal: `"` for string enums, empty otherwise.
    pub value_wrapper: String,
}

pub fn collect_enum_definitions(defs: &[TypeDefinition]) -> Vec<EnumDefinition> {
    defs.iter()
        .filter(|def| !def.schema.enum_values.is_empty())
        .map(|def| EnumDefinition {
            type_name: def.name.clone(),
            value_wrapper: if def.schema.type_decl() == "string" {
                "\"".to_string()
            } else {
                String::new()
            },
            schema: def.schema.clone(),
        })
        .collect()
}

/// Renders free text as line comments; blank input renders as nothing.
pub fn to_doc_comment(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let commented = normalized
        .split('\n')
        .map(|line| format!("// {}", line))
        .collect::<Vec<_>>()
        .join("\n");

    commented
        .strip_suffix("\n// ")
        .map(str::to_string)
        .unwrap_or(commented)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn string_property(name: &str, required: bool) -> PropertyDescriptor {
        let mut property = PropertyDescriptor::new(name, &name.to_uppercase(), SchemaNode::primitive("string"));
        property.required = required;
        property
    }

    #[test]
    fn array_of_reference_renders_as_slice() {
        let node = SchemaNode::array(SchemaNode::reference("Pet"));
        assert_eq!(node.type_decl(), "[]Pet");

        let def = TypeDefinition::new("Pets", "Pets", node);
        assert!(def.can_alias());
    }

    #[test]
    fn objects_are_not_aliasable() {
        let node = SchemaNode::new(SchemaKind::Object {
            properties: vec![string_property("name", true)],
            embedded: vec![],
            open_properties: None,
        });
        assert!(!TypeDefinition::new("Pet", "Pet", node).can_alias());
    }

    #[test]
    fn struct_rendering_includes_tags_and_open_properties() {
        let mut name = string_property("name", true);
        name.field_name = "Name".to_string();
        let mut tag = string_property("tag", false);
        tag.field_name = "Tag".to_string();
        tag.description = "Free-form label".to_string();

        let node = SchemaNode::new(SchemaKind::Object {
            properties: vec![name, tag],
            embedded: vec![],
            open_properties: Some(Box::new(SchemaNode::primitive("int"))),
        });

        assert_eq!(
            node.type_decl(),
            "struct {\n    Name string `json:\"name\"`\n\n// Free-form label\n    Tag *string `json:\"tag,omitempty\"`\nAdditionalProperties map[string]int `json:\"-\"`\n}"
        );
    }

    #[test]
    fn pointer_rules() {
        let mut property = string_property("name", true);
        assert_eq!(property.type_def(), "string");

        property.nullable = true;
        assert_eq!(property.type_def(), "*string");

        let raw = PropertyDescriptor::new("raw", "Raw", SchemaNode::primitive(RAW_JSON_TYPE));
        assert_eq!(raw.type_def(), RAW_JSON_TYPE);
    }

    #[test]
    fn extensions_shape_field_name_and_tags() {
        let mut property = string_property("name", false);
        property.extensions.insert(EXT_GO_NAME.to_string(), json!("DisplayName"));
        property.extensions.insert(EXT_OMIT_EMPTY.to_string(), json!(false));
        property
            .extensions
            .insert(EXT_EXTRA_TAGS.to_string(), json!({ "validate": "required" }));

        assert_eq!(property.go_field_name(), "DisplayName");
        assert_eq!(property.tags(), "json:\"name\" validate:\"required\"");
    }

    #[test]
    fn malformed_extensions_are_ignored() {
        let mut property = string_property("name", false);
        property.extensions.insert(EXT_GO_NAME.to_string(), json!(42));
        property.extensions.insert(EXT_OMIT_EMPTY.to_string(), json!("no"));

        assert_eq!(property.go_field_name(), "NAME");
        assert_eq!(property.tags(), "json:\"name,omitempty\"");
    }

    #[test]
    fn equivalent_duplicates_merge_and_conflicts_fail() {
        let mut properties = vec![string_property("name", true)];
        add_property(&mut properties, string_property("name", true)).unwrap();
        assert_eq!(properties.len(), 1);

        assert_eq!(
            add_property(&mut properties, string_property("name", false)),
            Err(CompileError::PropertyConflict("name".to_string()))
        );
    }

    #[test]
    fn nested_auxiliary_types_are_flattened_once() {
        let inner = TypeDefinition::new("Pet_Owner_Status", "Pet.owner.status", SchemaNode::primitive("string"));
        let mut owner_body = SchemaNode::new(SchemaKind::Object {
            properties: vec![],
            embedded: vec![],
            open_properties: Some(Box::new(SchemaNode::dynamic(ANY_TYPE))),
        });
        owner_body.auxiliary_types.push(inner.clone());

        let mut owner_ref = SchemaNode::reference("Pet_Owner");
        owner_ref
            .auxiliary_types
            .push(TypeDefinition::new("Pet_Owner", "Pet.owner", owner_body));

        let root = SchemaNode::new(SchemaKind::Object {
            properties: vec![
                PropertyDescriptor::new("owner", "Owner", owner_ref.clone()),
                PropertyDescriptor::new("previous_owner", "PreviousOwner", owner_ref),
            ],
            embedded: vec![],
            open_properties: None,
        });

        let names: Vec<String> = root
            .additional_type_defs()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Pet_Owner_Status", "Pet_Owner"]);
    }

    #[test]
    fn same_name_for_different_shapes_is_a_conflict() {
        let promoted = |element: &str| {
            let body = SchemaNode::new(SchemaKind::Object {
                properties: vec![],
                embedded: vec![],
                open_properties: Some(Box::new(SchemaNode::primitive(element))),
            });
            let mut reference = SchemaNode::reference("Pet_OwnerInfo");
            reference
                .auxiliary_types
                .push(TypeDefinition::new("Pet_OwnerInfo", "Pet.ownerInfo", body));
            reference
        };

        let root = SchemaNode::new(SchemaKind::Object {
            properties: vec![
                PropertyDescriptor::new("ownerInfo", "OwnerInfo", promoted("int")),
                PropertyDescriptor::new("owner_info", "OwnerInfo", promoted("string")),
            ],
            embedded: vec![],
            open_properties: None,
        });

        assert_eq!(
            root.additional_type_defs(),
            Err(CompileError::TypeNameConflict("Pet_OwnerInfo".to_string()))
        );
    }

    #[test]
    fn enum_definitions_quote_string_values() {
        let mut status = SchemaNode::primitive("string");
        status.enum_values.push(EnumValue::new("StatusActive", "active"));
        let mut level = SchemaNode::primitive("int");
        level.enum_values.push(EnumValue::new("LevelN1", "1"));

        let defs = vec![
            TypeDefinition::new("Status", "Status", status),
            TypeDefinition::new("Level", "Level", level),
            TypeDefinition::new("Name", "Name", SchemaNode::primitive("string")),
        ];
        let enums = collect_enum_definitions(&defs);

        assert_eq!(enums.len(), 2);
        assert_eq!(enums[0].value_wrapper, "\"");
        assert_eq!(enums[1].value_wrapper, "");
    }

    #[test]
    fn doc_comments() {
        assert_eq!(to_doc_comment(""), "");
        assert_eq!(to_doc_comment("  \n"), "");
        assert_eq!(to_doc_comment("one\r\ntwo"), "// one\n// two");
        assert_eq!(to_doc_comment("trailing\n"), "// trailing");
    }
}
