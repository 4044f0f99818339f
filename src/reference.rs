use std::collections::BTreeMap;

use crate::{CompileError, ImportAlias, NameFormatter};

/// Converts `$ref` paths into type names. References are never followed:
/// a cycle in the schema graph stays a cycle of names.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    import_mapping: &'a BTreeMap<String, ImportAlias>,
    names: &'a NameFormatter,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(import_mapping: &'a BTreeMap<String, ImportAlias>, names: &'a NameFormatter) -> Self {
        Self {
            import_mapping,
            names,
        }
    }

    /// `#/components/schemas/Foo` -> `Foo`
    ///
    /// `other.json#/components/schemas/Foo` -> `alias.Foo` when `other.json`
    /// is in the import mapping.
    pub fn resolve(&self, ref_path: &str) -> Result<String, CompileError> {
        self.resolve_path(ref_path, true)
    }

    fn resolve_path(&self, ref_path: &str, local: bool) -> Result<String, CompileError> {
        if ref_path.starts_with('#') {
            return self.resolve_fragment(ref_path, local);
        }

        let (document, fragment) = match ref_path.split('#').collect::<Vec<_>>().as_slice() {
            [document, fragment] => (*document, *fragment),
            _ => {
                return Err(CompileError::MalformedReference {
                    reference: ref_path.to_string(),
                    reason: "expected exactly one '#' separating document and path".to_string(),
                });
            }
        };

        let alias = self
            .import_mapping
            .get(document)
            .ok_or_else(|| CompileError::UnmappedExternalDocument(document.to_string()))?;
        let type_name = self.resolve_path(&format!("#{}", fragment), false)?;

        Ok(format!("{}.{}", alias.name, type_name))
    }

    fn resolve_fragment(&self, ref_path: &str, local: bool) -> Result<String, CompileError> {
        let parts: Vec<&str> = ref_path.split('/').collect();
        let depth = parts.len();
        let depth_ok = if local {
            depth == 4
        } else {
            depth == 4 || depth == 2
        };
        if !depth_ok {
            return Err(CompileError::MalformedReference {
                reference: ref_path.to_string(),
                reason: format!("unexpected reference depth {} (local: {})", depth, local),
            });
        }

        match parts.last() {
            Some(name) if !name.is_empty() => Ok(self.names.identifier_type_name(name)),
            _ => Err(CompileError::MalformedReference {
                reference: ref_path.to_string(),
                reason: "empty type name".to_string(),
            }),
        }
    }
}
