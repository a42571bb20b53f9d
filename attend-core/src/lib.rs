pub mod config;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod intent;
pub mod ipc;
pub mod query;
pub mod render;
pub mod times;
pub mod translate;

pub use config::AttendConfig;
pub use error::{AttendError, TranslationError};
pub use extractor::{
    create_extractor, EntityCategory, EntityExtractor, ExtractedContext, ExtractionError,
    NamedReferenceKind, RuleBasedExtractor, TaggedSpan,
};
pub use query::{Comparator, Field, Literal, Predicate, QueryIntent, StructuredQuery};
pub use render::{PostgresRenderer, QueryRenderer};
pub use translate::Translator;
