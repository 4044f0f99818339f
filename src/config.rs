use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::Error;

pub const DEFAULT_RESERVED_WORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

pub const DEFAULT_PREDECLARED_NAMES: &[&str] = &[
    // Types
    "bool",
    "byte",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    // Constants
    "true",
    "false",
    "iota",
    "nil",
    // Functions
    "append",
    "cap",
    "close",
    "complex",
    "copy",
    "delete",
    "imag",
    "len",
    "make",
    "new",
    "panic",
    "print",
    "println",
    "real",
    "recover",
];

/// Canonical spellings; matching is done on the capitalized form
/// (`Http`, `Oauth`, `Pdf417`).
pub const DEFAULT_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
    "OAuth", "OFAC", "NASA", "USD", "EUR", "BTC", "ETH", "PDF", "PDF417", "SSN", "SMS",
];

/// An external document the reference resolver may point into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAlias {
    /// Namespace used to qualify types from the document, e.g. `externalRef0`.
    pub name: String,
    /// Import path of the namespace, handed through to the renderer.
    pub path: String,
}

/// Lookup tables for one compilation. Passed by value to the compiler;
/// nothing here is process-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub import_mapping: BTreeMap<String, ImportAlias>,
    pub reserved_words: Vec<String>,
    pub predeclared_names: Vec<String>,
    pub initialisms: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            import_mapping: BTreeMap::new(),
            reserved_words: to_strings(DEFAULT_RESERVED_WORDS),
            predeclared_names: to_strings(DEFAULT_PREDECLARED_NAMES),
            initialisms: to_strings(DEFAULT_INITIALISMS),
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(content: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_import(mut self, document: &str, name: &str, path: &str) -> Self {
        self.import_mapping.insert(
            document.to_string(),
            ImportAlias {
                name: name.to_string(),
                path: path.to_string(),
            },
        );
        self
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_default_tables() {
        let config = CompilerConfig::from_json_str(
            r#"{ "import_mapping": { "common.json": { "name": "common", "path": "example.com/common" } } }"#,
        )
        .unwrap();

        assert_eq!(config.import_mapping["common.json"].name, "common");
        assert!(config.reserved_words.iter().any(|w| w == "struct"));
        assert!(config.initialisms.iter().any(|w| w == "OAuth"));
    }

    #[test]
    fn with_import_adds_mapping() {
        let config = CompilerConfig::default().with_import("doc.json", "ext", "example.com/ext");
        assert_eq!(
            config.import_mapping.get("doc.json"),
            Some(&ImportAlias {
                name: "ext".to_string(),
                path: "example.com/ext".to_string(),
            })
        );
    }
}
