use crate::CompileError;

pub const BYTES_TYPE: &str = "[]byte";
pub const EMAIL_TYPE: &str = "openapi_types.Email";
pub const DATE_TYPE: &str = "openapi_types.Date";
pub const TIMESTAMP_TYPE: &str = "time.Time";
pub const RAW_JSON_TYPE: &str = "json.RawMessage";
pub const UUID_TYPE: &str = "openapi_types.UUID";
pub const STRING_TYPE: &str = "string";

/// Result of mapping a (format, type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// The caller has to recurse into the item schema.
    Array,
    Scalar(&'static str),
}

pub fn resolve_primitive(format: Option<&str>, kind: &str) -> Result<PrimitiveType, CompileError> {
    let format = format.unwrap_or("");
    let unsupported = |kind: &str| CompileError::UnsupportedFormat {
        kind: kind.to_string(),
        format: format.to_string(),
    };

    let scalar = match kind {
        "array" => return Ok(PrimitiveType::Array),
        "integer" => match format {
            "" | "int" => "int",
            "int64" => "int64",
            "int32" => "int32",
            "int16" => "int16",
            "int8" => "int8",
            "uint" => "uint",
            "uint64" => "uint64",
            "uint32" => "uint32",
            "uint16" => "uint16",
            "uint8" => "uint8",
            _ => return Err(unsupported("integer")),
        },
        "number" => match format {
            "" | "float" => "float32",
            "double" => "float64",
            _ => return Err(unsupported("number")),
        },
        "boolean" => match format {
            "" => "bool",
            _ => return Err(unsupported("boolean")),
        },
        // Open-ended: unknown string formats are plain strings.
        "string" => match format {
            "byte" => BYTES_TYPE,
            "email" => EMAIL_TYPE,
            "date" => DATE_TYPE,
            "date-time" => TIMESTAMP_TYPE,
            "json" => RAW_JSON_TYPE,
            "uuid" => UUID_TYPE,
            _ => STRING_TYPE,
        },
        other => return Err(CompileError::UnhandledType(other.to_string())),
    };

    Ok(PrimitiveType::Scalar(scalar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scalar(format: Option<&str>, kind: &str) -> &'static str {
        match resolve_primitive(format, kind) {
            Ok(PrimitiveType::Scalar(t)) => t,
            other => panic!("expected scalar for {kind}/{format:?}, got {other:?}"),
        }
    }

    #[test]
    fn integers_default_to_platform_int() {
        assert_eq!(scalar(None, "integer"), "int");
        assert_eq!(scalar(Some(""), "integer"), "int");
        assert_eq!(scalar(Some("int64"), "integer"), "int64");
        assert_eq!(scalar(Some("uint8"), "integer"), "uint8");
    }

    #[test]
    fn numbers_default_to_single_precision() {
        assert_eq!(scalar(None, "number"), "float32");
        assert_eq!(scalar(Some("double"), "number"), "float64");
    }

    #[test]
    fn string_formats() {
        assert_eq!(scalar(Some("byte"), "string"), BYTES_TYPE);
        assert_eq!(scalar(Some("date-time"), "string"), TIMESTAMP_TYPE);
        assert_eq!(scalar(Some("uuid"), "string"), UUID_TYPE);
        assert_eq!(scalar(Some("json"), "string"), RAW_JSON_TYPE);
        assert_eq!(scalar(Some("hostname"), "string"), STRING_TYPE);
    }

    #[test]
    fn array_is_a_sentinel() {
        assert_eq!(resolve_primitive(Some("whatever"), "array"), Ok(PrimitiveType::Array));
    }

    #[test]
    fn unknown_formats_are_errors_outside_strings() {
        assert_eq!(
            resolve_primitive(Some("int128"), "integer"),
            Err(CompileError::UnsupportedFormat {
                kind: "integer".to_string(),
                format: "int128".to_string(),
            })
        );
        assert!(resolve_primitive(Some("decimal"), "number").is_err());
        assert!(resolve_primitive(Some("flag"), "boolean").is_err());
        assert_eq!(
            resolve_primitive(None, "file"),
            Err(CompileError::UnhandledType("file".to_string()))
        );
    }
}
