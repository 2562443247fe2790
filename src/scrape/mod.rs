// Page scraping.
// A tolerant markup parser and the strategy that reads the public repository listing with it.

pub mod markup;
pub mod source;

pub use markup::{Document, NodeId, decode_entities};
pub use source::{MIN_BODY_LEN, ScrapeSource, expand_proxy, extract_repos};
