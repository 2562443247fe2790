// repofolio library.
// Repository portfolio loading, page assembly and the terminal preview.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod github;
pub mod logging;
pub mod page;
pub mod render;
pub mod scrape;
pub mod state;
pub mod ui;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{FolioError, Result};
