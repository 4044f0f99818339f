pub mod config;
pub mod domain;
pub mod enums;
pub mod errors;
pub mod merge;
pub mod name_formatter;
pub mod ordering;
pub mod primitives;
pub mod reference;
pub mod schema;
pub mod schema2model;
pub mod type_expr;

pub use config::*;
pub use domain::*;
pub use enums::EnumExtractor;
pub use errors::*;
pub use name_formatter::NameFormatter;
pub use primitives::*;
pub use reference::ReferenceResolver;
pub use schema::*;
pub use schema2model::{SchemaCompiler, TypeModel};
pub use type_expr::{TypeExpr, parse_type_expr};
