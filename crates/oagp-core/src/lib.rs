pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod model;

pub use api::{GenerationApi, SpecFetcher};
pub use form::{FormState, Phase, Submission};
pub use model::{
    GenerationRequest, GenerationResult, LanguageCatalog, Mode, Notification,
    NotificationVariant, SelectedFile, SpecInputs, SpecSource,
};
