// Reading, writing and reference resolution for workflow documents.

pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod reader;
pub mod resolver;
pub mod validator;
mod visit;
pub mod writer;

pub use config::{FetchConfig, ReaderOptions, RelativeUriResolution};
pub use error::ReaderError;
pub use fetch::{HttpResourceFetcher, ResourceFetcher};
pub use format::WorkflowFormat;
pub use reader::WorkflowReader;
pub use resolver::ExternalReferenceResolver;
pub use validator::{JsonSchemaValidator, SchemaValidator};
pub use writer::WorkflowWriter;
