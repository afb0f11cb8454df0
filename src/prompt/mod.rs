pub(crate) mod library;

pub use library::{Bindings, PromptError, PromptInstance, PromptLibrary, TemplateId};
