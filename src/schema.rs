//! Input side: the already-parsed OpenAPI schema graph.
//!
//! These structs mirror the document closely and are filled by serde; the
//! compiler never looks at raw text.

use either::Either;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Overrides the generated type of a schema.
pub const EXT_GO_TYPE: &str = "x-go-type";
/// Overrides the generated field name of a property.
pub const EXT_GO_NAME: &str = "x-go-name";
/// Forces or suppresses omit-empty serialization of a property.
pub const EXT_OMIT_EMPTY: &str = "x-omitempty";
/// Extra serialization tags for a property.
pub const EXT_EXTRA_TAGS: &str = "x-go-extra-tags";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    /// `true`/`false` or the schema of the extra values.
    #[serde(
        with = "either::serde_untagged_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Either<bool, Box<Schema>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    pub nullable: bool,
    pub read_only: bool,
    pub write_only: bool,
    /// Unrecognized keys; only `x-` prefixed ones are treated as extensions.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Schema {
    /// The reference path, if this node is a reference.
    pub fn reference(&self) -> Option<&str> {
        self.ref_path.as_deref().filter(|r| !r.is_empty())
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    pub fn vendor_extensions(&self) -> BTreeMap<String, Value> {
        self.extensions
            .iter()
            .filter(|(key, _)| key.starts_with("x-"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Whether extra, undeclared fields are modelled. Only an explicit `true`
    /// or an explicit schema counts; an absent keyword does not.
    pub fn has_additional_properties(&self) -> bool {
        match &self.additional_properties {
            Some(Either::Left(allowed)) => *allowed,
            Some(Either::Right(_)) => true,
            None => false,
        }
    }

    pub fn additional_properties_schema(&self) -> Option<&Schema> {
        match &self.additional_properties {
            Some(Either::Right(schema)) => Some(schema),
            _ => None,
        }
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// Enum members as text: strings verbatim, everything else as JSON.
    pub fn enum_literals(&self) -> Vec<String> {
        self.enum_values
            .iter()
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    pub required: bool,
    pub schema: Option<Schema>,
    pub content: HashMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    pub description: Option<String>,
    pub content: HashMap<String, MediaType>,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub description: String,
    pub content: HashMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Components {
    pub schemas: HashMap<String, Schema>,
    pub parameters: HashMap<String, Parameter>,
    pub request_bodies: HashMap<String, RequestBody>,
    pub responses: HashMap<String, Response>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub openapi: Option<String>,
    pub components: Option<Components>,
}
