// State management module.
// Loading states shared with the renderer plus preview-only selection and form state.

pub mod contact;
pub mod loading;
pub mod selection;

pub use contact::{ContactDraft, ContactField};
pub use loading::LoadingState;
pub use selection::CardSelection;
