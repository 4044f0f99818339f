use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Type expression error: {0}")]
    TypeExpr(#[from] TypeExprError),
}

/// Reasons a schema subtree cannot be turned into a type model.
///
/// Every error raised while compiling a node is wrapped once in
/// [`CompileError::AtPath`] with the property path that led to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("malformed reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error(
        "unrecognized external reference '{0}'; provide the known import for this reference in the import mapping"
    )]
    UnmappedExternalDocument(String),

    #[error("property '{0}' already exists with a different type")]
    PropertyConflict(String),

    #[error("invalid {kind} format: {format}")]
    UnsupportedFormat { kind: String, format: String },

    #[error("unhandled schema type: {0}")]
    UnhandledType(String),

    #[error("type name '{0}' is generated for two different schemas")]
    TypeNameConflict(String),

    #[error("parameter '{0}' has no schema or content")]
    MissingSchemaOrContent(String),

    #[error("invalid value for {key}: {message}")]
    InvalidExtension { key: String, message: String },

    #[error("at '{path}': {source}")]
    AtPath {
        path: String,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Attaches the traversal path, unless a deeper path is already attached.
    pub fn at_path(self, path: &[String]) -> Self {
        match self {
            CompileError::AtPath { .. } => self,
            other => CompileError::AtPath {
                path: display_path(path),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error kind with any path annotation stripped.
    pub fn kind(&self) -> &CompileError {
        match self {
            CompileError::AtPath { source, .. } => source.kind(),
            other => other,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            CompileError::AtPath { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeExprError {
    #[error("cannot parse type expression '{input}' (stopped at '{remaining}')")]
    Syntax { input: String, remaining: String },

    #[error("incomplete type expression '{0}'")]
    Incomplete(String),
}
