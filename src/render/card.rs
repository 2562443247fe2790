// Repository card.
// Display-ready card data and its HTML markup.

use std::fmt::Write;

use crate::github::RepoSummary;

use super::format::{escape_html, format_count, format_date, language_color, safe_link};

/// Topics shown per card.
pub const MAX_TOPICS: usize = 5;

const NO_DESCRIPTION: &str = "No description available.";
const UNNAMED: &str = "Unnamed";

/// Language badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageBadge {
    pub name: String,
    pub color: &'static str,
}

/// One repository, formatted for display. Text is raw; escaping happens on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub url: String,
    pub description: String,
    pub language: Option<LanguageBadge>,
    pub topics: Vec<String>,
    pub stars: String,
    pub forks: String,
    pub updated: Option<String>,
}

impl Card {
    pub fn from_repo(repo: &RepoSummary) -> Self {
        let name = match repo.name.trim() {
            "" => UNNAMED.to_string(),
            name => name.to_string(),
        };
        let description = match repo.description.trim() {
            "" => NO_DESCRIPTION.to_string(),
            description => description.to_string(),
        };
        let language = match repo.language.trim() {
            "" => None,
            language => Some(LanguageBadge {
                name: language.to_string(),
                color: language_color(language),
            }),
        };

        Self {
            name,
            url: safe_link(&repo.url),
            description,
            language,
            topics: repo
                .topics
                .iter()
                .filter(|t| !t.trim().is_empty())
                .take(MAX_TOPICS)
                .cloned()
                .collect(),
            stars: format_count(repo.stars),
            forks: format_count(repo.forks),
            updated: repo.pushed_at_time().map(|dt| format_date(&dt)),
        }
    }

    /// Card markup. Every provider-supplied string is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        // Writing into a String cannot fail.
        let _ = writeln!(html, r#"<article class="portfolio-item">"#);
        let _ = writeln!(html, r#"  <div class="project-header">"#);
        let _ = writeln!(
            html,
            r#"    <div><h3 class="project-title"><a href="{}" target="_blank" rel="noopener">{}</a></h3></div>"#,
            escape_html(&self.url),
            escape_html(&self.name)
        );
        if let Some(language) = &self.language {
            let _ = writeln!(
                html,
                r#"    <span class="project-language" style="background:{}">{}</span>"#,
                language.color,
                escape_html(&language.name)
            );
        }
        let _ = writeln!(html, "  </div>");
        let _ = writeln!(
            html,
            r#"  <p class="project-description">{}</p>"#,
            escape_html(&self.description)
        );

        if !self.topics.is_empty() {
            let _ = write!(html, r#"  <div class="project-topics">"#);
            for topic in &self.topics {
                let _ = write!(
                    html,
                    r#"<span class="project-topic">{}</span>"#,
                    escape_html(topic)
                );
            }
            let _ = writeln!(html, "</div>");
        }

        let _ = writeln!(html, r#"  <div class="project-stats">"#);
        let _ = writeln!(html, r#"    <div class="project-stat">⭐ {}</div>"#, self.stars);
        let _ = writeln!(html, r#"    <div class="project-stat">🍴 {}</div>"#, self.forks);
        if let Some(updated) = &self.updated {
            let _ = writeln!(
                html,
                r#"    <div class="project-stat">🕒 {}</div>"#,
                escape_html(updated)
            );
        }
        let _ = writeln!(html, "  </div>");
        let _ = write!(html, "</article>");

        html
    }
}
