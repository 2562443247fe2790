// Static page assembly.
// Fills a template's portfolio section, resume triggers and image fallbacks by
// rewriting the located elements in place.

pub mod template;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::{FolioError, Result};
use crate::render::{Grid, PortfolioView, escape_html};
use crate::scrape::{Document, NodeId};
use crate::state::LoadingState;
use crate::widgets::{PLACEHOLDER_ATTR, PLACEHOLDER_CLASS, placeholder_uri};

pub use template::BUILTIN_TEMPLATE;

pub const GRID_ID: &str = "portfolioGrid";
pub const LOADING_ID: &str = "portfolioLoading";
pub const ERROR_ID: &str = "portfolioError";
pub const BADGE_ID: &str = "cacheBadge";
pub const REFRESH_ID: &str = "refreshReposBtn";
pub const RETRY_ID: &str = "retryReposBtn";
pub const MODAL_ID: &str = "downloadSuccessModal";
pub const CONTACT_FORM_ID: &str = "contactForm";
pub const FORM_STATUS_ID: &str = "formStatus";
pub const SUBMIT_ID: &str = "submitBtn";

/// Resume triggers looked up by exact id before the prefix fallback.
pub const RESUME_TRIGGER_IDS: &[&str] = &["downloadResumeBtn", "downloadResumeBtn2"];
pub const RESUME_TRIGGER_PREFIX: &str = "downloadResumeBtn";

/// Ids the page is expected to carry.
pub const PAGE_IDS: &[&str] = &[
    GRID_ID,
    LOADING_ID,
    ERROR_ID,
    BADGE_ID,
    REFRESH_ID,
    RETRY_ID,
    "downloadResumeBtn",
    MODAL_ID,
    CONTACT_FORM_ID,
    FORM_STATUS_ID,
    SUBMIT_ID,
];

/// Where resume triggers point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeLink {
    pub href: String,
    pub filename: String,
}

/// Changes to one start tag.
#[derive(Debug, Default)]
struct TagEdit {
    set: Vec<(String, String)>,
    remove: Vec<&'static str>,
    add_class: Vec<&'static str>,
}

impl TagEdit {
    fn set(&mut self, name: &str, value: impl Into<String>) {
        self.remove.retain(|removed| *removed != name);
        self.set.retain(|(key, _)| key != name);
        self.set.push((name.to_string(), value.into()));
    }

    fn remove(&mut self, name: &'static str) {
        self.set.retain(|(key, _)| key != name);
        self.remove.push(name);
    }

    fn hidden(&mut self, hidden: bool) {
        if hidden {
            self.set("hidden", "");
        } else {
            self.remove("hidden");
        }
    }
}

/// A page template and the elements located in it.
#[derive(Debug, Clone)]
pub struct Page {
    source: String,
    doc: Document,
}

impl Page {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let doc = Document::parse(&source);
        Self { source, doc }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_TEMPLATE)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let source = String::from_utf8(bytes).map_err(|e| {
            FolioError::Template(format!("{} is not UTF-8: {}", path.display(), e))
        })?;
        Ok(Self::new(source))
    }

    /// Expected ids the template does not carry.
    pub fn missing_ids(&self) -> Vec<&'static str> {
        PAGE_IDS
            .iter()
            .copied()
            .filter(|id| self.doc.find_by_id(id).is_none())
            .collect()
    }

    /// Sources of images that opted into the fallback, in document order.
    pub fn placeholder_images(&self) -> Vec<String> {
        self.placeholder_nodes()
            .map(|img| self.doc.attr(img, "src").unwrap_or_default().to_string())
            .collect()
    }

    fn placeholder_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.doc
            .elements_named(self.doc.root(), "img")
            .filter(|&img| self.doc.attr(img, PLACEHOLDER_ATTR).is_some())
    }

    /// Every resume trigger: the fixed ids first, then any id with the prefix, each once.
    pub fn resume_triggers(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut triggers = Vec::new();

        let fixed = RESUME_TRIGGER_IDS
            .iter()
            .filter_map(|id| self.doc.find_by_id(id));
        let prefixed = self.doc.elements(self.doc.root()).filter(|&n| {
            self.doc
                .attr(n, "id")
                .is_some_and(|id| id.starts_with(RESUME_TRIGGER_PREFIX))
        });

        for node in fixed.chain(prefixed) {
            if seen.insert(node) {
                triggers.push(node);
            }
        }
        triggers
    }

    /// Render the page for `view`.
    pub fn assemble(
        &self,
        view: &PortfolioView,
        resume: &ResumeLink,
        broken_images: &[String],
    ) -> String {
        for id in self.missing_ids() {
            tracing::warn!("Template has no element with id {}", id);
        }

        let mut tags: HashMap<NodeId, TagEdit> = HashMap::new();
        let mut contents: Vec<(Range<usize>, String)> = Vec::new();

        let grid = view.state.data();
        let (show_loading, show_error) = match &view.state {
            LoadingState::Idle | LoadingState::Loading => (true, false),
            LoadingState::Error(_) => (false, true),
            LoadingState::Loaded(_) => (false, false),
        };

        if let Some(node) = self.doc.find_by_id(LOADING_ID) {
            tags.entry(node).or_default().hidden(!show_loading);
        }
        if let Some(node) = self.doc.find_by_id(ERROR_ID) {
            tags.entry(node).or_default().hidden(!show_error);
        }
        if let Some(node) = self.doc.find_by_id(GRID_ID) {
            tags.entry(node).or_default().hidden(grid.is_none());
            contents.push((self.doc.inner_span(node), grid_html(grid)));
        }
        if let Some(node) = self.doc.find_by_id(BADGE_ID) {
            let badge = grid.map(|g| g.badge.as_str()).unwrap_or_default();
            tags.entry(node).or_default().hidden(grid.is_none());
            contents.push((self.doc.inner_span(node), escape_html(badge)));
        }
        if let Some(node) = self.doc.find_by_id(REFRESH_ID) {
            let edit = tags.entry(node).or_default();
            if view.refreshing {
                edit.set("disabled", "");
            } else {
                edit.remove("disabled");
            }
        }

        for trigger in self.resume_triggers() {
            let edit = tags.entry(trigger).or_default();
            edit.set("href", resume.href.clone());
            edit.set("download", resume.filename.clone());
        }

        let placeholder = placeholder_uri();
        for img in self.placeholder_nodes() {
            let src = self.doc.attr(img, "src").unwrap_or_default();
            if broken_images.iter().any(|broken| broken == src) {
                let edit = tags.entry(img).or_default();
                edit.set("data-initial-src", src);
                edit.set("src", placeholder.clone());
                edit.add_class.push(PLACEHOLDER_CLASS);
            }
        }

        let mut edits = contents;
        for (node, edit) in &tags {
            let Some(tag) = self.doc.tag(*node) else {
                continue;
            };
            let attrs = apply_tag_edit(self.doc.attrs(*node), edit);
            edits.push((self.doc.open_span(*node), start_tag(tag, &attrs)));
        }

        apply_edits(&self.source, edits)
    }
}

fn grid_html(grid: Option<&Grid>) -> String {
    match grid {
        Some(grid) => {
            let cards: Vec<String> = grid.cards.iter().map(|card| card.to_html()).collect();
            format!("\n{}\n", cards.join("\n"))
        }
        None => String::new(),
    }
}

fn apply_tag_edit(attrs: &[(String, String)], edit: &TagEdit) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = attrs
        .iter()
        .filter(|(key, _)| !edit.remove.contains(&key.as_str()))
        .cloned()
        .collect();

    for (key, value) in &edit.set {
        match result.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, existing)) => *existing = value.clone(),
            None => result.push((key.clone(), value.clone())),
        }
    }

    for class in &edit.add_class {
        match result.iter_mut().find(|(key, _)| key == "class") {
            Some((_, classes)) => {
                if !classes.split_whitespace().any(|c| c == *class) {
                    if !classes.is_empty() {
                        classes.push(' ');
                    }
                    classes.push_str(class);
                }
            }
            None => result.push(("class".to_string(), class.to_string())),
        }
    }

    result
}

fn start_tag(tag: &str, attrs: &[(String, String)]) -> String {
    let mut out = format!("<{}", tag);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        }
    }
    out.push('>');
    out
}

/// Apply non-overlapping span replacements. Overlapping edits after the first are dropped.
fn apply_edits(source: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(span, _)| (span.start, span.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for (span, replacement) in edits {
        if span.start < cursor {
            tracing::warn!("Skipping overlapping page edit at byte {}", span.start);
            continue;
        }
        out.push_str(&source[cursor..span.start]);
        out.push_str(&replacement);
        cursor = span.end;
    }
    out.push_str(&source[cursor..]);
    out
}
