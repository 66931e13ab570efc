pub mod collections;
pub mod error;
pub mod logging;
pub mod object;
pub mod one_of;
pub mod validation;

pub use collections::{EquatableList, EquatableMap, NamedMap};
pub use error::{DefinitionError, ErrorKind};
pub use one_of::{OneOf, OneOfRef};

/// DSL version written into documents built without an explicit `dsl` value.
pub static DEFAULT_DSL_VERSION: &str = "1.0.0";
pub static DEFAULT_NAMESPACE: &str = "default";
