// Page-scrape strategy.
// Fetches the public repository listing through text proxies and extracts entries
// from whatever markup comes back.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::{FolioError, Result};
use crate::fetch::{FetchFuture, RepoSource, with_timeout};
use crate::github::RepoSummary;
use crate::render::format::encode_uri_component;

use super::markup::{Document, NodeId};

/// Bodies this short are error pages, not listings.
pub const MIN_BODY_LEN: usize = 200;

const SITE_ROOT: &str = "https://github.com";
const LIST_ROOT_ID: &str = "user-repositories-list";
const TIME_TAGS: &[&str] = &["relative-time", "time-ago", "time"];
const FORK_MARKERS: &[&str] = &["/network/members", "/network", "/forks"];

/// Repository source that scrapes the listing page.
#[derive(Debug, Clone)]
pub struct ScrapeSource {
    client: Client,
    page_url: String,
    proxies: Vec<String>,
    max_repos: usize,
}

impl ScrapeSource {
    /// `proxies` are URL templates; see [`expand_proxy`].
    pub fn new(page_url: impl Into<String>, proxies: Vec<String>, max_repos: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("repofolio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            page_url: page_url.into(),
            proxies,
            max_repos,
        })
    }

    /// First proxy response that is a success with a long enough body.
    async fn fetch_markup(
        client: &Client,
        page_url: &str,
        proxies: &[String],
        timeout: Duration,
    ) -> Option<String> {
        for template in proxies {
            let url = match expand_proxy(template, page_url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping proxy {}: {}", template, e);
                    continue;
                }
            };

            match with_timeout(timeout, fetch_text(client, &url)).await {
                Ok(body) if body.len() > MIN_BODY_LEN => return Some(body),
                Ok(body) => {
                    tracing::debug!("Proxy {} returned only {} bytes", url, body.len());
                }
                Err(e) => tracing::debug!("Proxy {} failed: {}", url, e),
            }
        }
        None
    }
}

async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FolioError::Http {
            status,
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

impl RepoSource for ScrapeSource {
    fn name(&self) -> &'static str {
        "scrape"
    }

    fn fetch(&self, timeout: Duration) -> FetchFuture {
        let client = self.client.clone();
        let page_url = self.page_url.clone();
        let proxies = self.proxies.clone();
        let max_repos = self.max_repos;

        Box::pin(async move {
            let Some(markup) = Self::fetch_markup(&client, &page_url, &proxies, timeout).await
            else {
                tracing::warn!("Page scrape found no usable markup");
                return None;
            };

            let repos = extract_repos(&markup, max_repos);
            tracing::debug!("Page scrape extracted {} repositories", repos.len());
            if repos.is_empty() { None } else { Some(repos) }
        })
    }
}

/// Expand a proxy template for `page_url`.
///
/// `{url}` becomes the percent-encoded page URL and `{path}` its path.
pub fn expand_proxy(template: &str, page_url: &str) -> Result<String> {
    let page = Url::parse(page_url)
        .map_err(|e| FolioError::Other(format!("invalid page url {}: {}", page_url, e)))?;

    Ok(template
        .replace("{url}", &encode_uri_component(page_url))
        .replace("{path}", page.path()))
}

/// Extract up to `max_repos` entries from listing markup.
pub fn extract_repos(markup: &str, max_repos: usize) -> Vec<RepoSummary> {
    let doc = Document::parse(markup);
    let root = doc.find_by_id(LIST_ROOT_ID).unwrap_or_else(|| doc.root());

    let mut repos = Vec::new();
    for item in doc.elements_named(root, "li") {
        if repos.len() >= max_repos {
            break;
        }
        let Some(title_link) = title_link(&doc, item) else {
            continue;
        };
        if let Some(repo) = extract_entry(&doc, item, title_link) {
            repos.push(repo);
        }
    }
    repos
}

/// The first `a` inside an `h3` inside `item`.
fn title_link(doc: &Document, item: NodeId) -> Option<NodeId> {
    doc.elements_named(item, "a")
        .find(|&a| has_ancestor_within(doc, a, item, "h3"))
}

fn has_ancestor_within(doc: &Document, node: NodeId, scope: NodeId, tag: &str) -> bool {
    let mut current = doc.parent(node);
    while let Some(parent) = current {
        if parent == scope {
            return false;
        }
        if doc.is_element(parent, tag) {
            return true;
        }
        current = doc.parent(parent);
    }
    false
}

fn extract_entry(doc: &Document, item: NodeId, title_link: NodeId) -> Option<RepoSummary> {
    let name = doc.text(title_link);
    let url = doc
        .attr(title_link, "href")
        .filter(|href| !href.trim().is_empty())
        .and_then(absolutize)?;
    if name.is_empty() {
        return None;
    }

    let description = doc
        .elements_named(item, "p")
        .next()
        .or_else(|| doc.find(item, |n| doc.attr(n, "itemprop") == Some("description")))
        .map(|n| doc.text(n))
        .unwrap_or_default();

    let language = doc
        .find(item, |n| doc.attr(n, "itemprop") == Some("programmingLanguage"))
        .map(|n| doc.text(n))
        .unwrap_or_default();

    let stars = count_link(doc, item, &["/stargazers"]);
    let forks = count_link(doc, item, FORK_MARKERS);

    let pushed_at = doc
        .find(item, |n| doc.tag(n).is_some_and(|tag| TIME_TAGS.contains(&tag)))
        .map(|n| match doc.attr(n, "datetime") {
            Some(datetime) if !datetime.is_empty() => datetime.to_string(),
            _ => doc.text(n),
        })
        .unwrap_or_default();

    let topics = doc
        .elements(item)
        .filter(|&n| {
            doc.has_class(n, "topic-tag")
                || (doc.is_element(n, "a")
                    && doc.attr(n, "href").is_some_and(|href| href.contains("/topics/")))
        })
        .map(|n| doc.text(n))
        .filter(|topic| !topic.is_empty())
        .collect();

    Some(RepoSummary {
        name,
        url,
        description,
        language,
        stars,
        forks,
        pushed_at,
        topics,
    })
}

/// Digits of the first link whose href contains any of `markers`; 0 if none.
fn count_link(doc: &Document, item: NodeId, markers: &[&str]) -> u64 {
    doc.elements_named(item, "a")
        .find(|&a| {
            doc.attr(a, "href")
                .is_some_and(|href| markers.iter().any(|marker| href.contains(marker)))
        })
        .map(|a| parse_digits(&doc.text(a)))
        .unwrap_or(0)
}

/// Number formed by the digits of `text`, ignoring everything else.
fn parse_digits(text: &str) -> u64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn absolutize(href: &str) -> Option<String> {
    let base = Url::parse(SITE_ROOT).ok()?;
    base.join(href.trim()).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestServer, silent_server};
    use pretty_assertions::assert_eq;

    const LISTING: &str = r#"
<html><body>
<nav><ul><li><h3><a href="/features">Not a repo</a></h3></li></ul></nav>
<div id="user-repositories-list">
  <ul>
    <li class="col-12">
      <h3><a href="/GLOKADHI/alpha" itemprop="name codeRepository"> alpha </a></h3>
      <p itemprop="description">First &amp; best</p>
      <a class="topic-tag" href="/topics/rust">rust</a>
      <a href="/topics/cli">cli</a>
      <span itemprop="programmingLanguage">Rust</span>
      <a href="/GLOKADHI/alpha/stargazers"> 1,234 </a>
      <a href="/GLOKADHI/alpha/forks">56</a>
      <relative-time datetime="2024-03-01T10:00:00Z">Mar 1</relative-time>
    </li>
    <li>
      <h3><a href="https://github.com/GLOKADHI/beta">beta</a></h3>
      <div itemprop="description">Second</div>
      <a href="/GLOKADHI/beta/network/members">7</a>
      <time>yesterday</time>
    </li>
    <li><span>no title here</span></li>
    <li><h3><a>missing href</a></h3></li>
  </ul>
</div>
</body></html>
"#;

    #[test]
    fn test_extract_listing() {
        let repos = extract_repos(LISTING, 8);

        assert_eq!(repos.len(), 2);
        assert_eq!(
            repos[0],
            RepoSummary {
                name: "alpha".to_string(),
                url: "https://github.com/GLOKADHI/alpha".to_string(),
                description: "First & best".to_string(),
                language: "Rust".to_string(),
                stars: 1234,
                forks: 56,
                pushed_at: "2024-03-01T10:00:00Z".to_string(),
                topics: vec!["rust".to_string(), "cli".to_string()],
            }
        );
        assert_eq!(repos[1].name, "beta");
        assert_eq!(repos[1].description, "Second");
        assert_eq!(repos[1].forks, 7);
        assert_eq!(repos[1].stars, 0);
        assert_eq!(repos[1].pushed_at, "yesterday");
        assert!(repos[1].topics.is_empty());
    }

    #[test]
    fn test_extract_without_list_root_uses_whole_document() {
        let markup = r#"<ul><li><h3><a href="/u/solo">solo</a></h3></li></ul>"#;
        let repos = extract_repos(markup, 8);
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].url, "https://github.com/u/solo");
    }

    #[test]
    fn test_extract_stops_at_max() {
        let items: String = (0..12)
            .map(|i| format!(r#"<li><h3><a href="/u/r{i}">r{i}</a></h3></li>"#))
            .collect();
        let repos = extract_repos(&format!("<ul>{}</ul>", items), 8);
        assert_eq!(repos.len(), 8);
        assert_eq!(repos[7].name, "r7");
    }

    #[test]
    fn test_extract_garbage_is_empty() {
        assert!(extract_repos("<<not html>>", 8).is_empty());
        assert!(extract_repos("", 8).is_empty());
    }

    #[test]
    fn test_expand_proxy_templates() {
        let page = "https://github.com/GLOKADHI?tab=repositories";
        assert_eq!(
            expand_proxy("https://api.allorigins.win/raw?url={url}", page).unwrap(),
            "https://api.allorigins.win/raw?url=https%3A%2F%2Fgithub.com%2FGLOKADHI%3Ftab%3Drepositories"
        );
        assert_eq!(
            expand_proxy("https://r.jina.ai/http://github.com{path}?tab=repositories", page)
                .unwrap(),
            "https://r.jina.ai/http://github.com/GLOKADHI?tab=repositories"
        );
        assert!(expand_proxy("{url}", "not a url").is_err());
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits(" 1,234 "), 1234);
        assert_eq!(parse_digits("stars"), 0);
        assert_eq!(parse_digits("1.2k"), 12);
    }

    fn padded(markup: &str) -> String {
        format!("{}<!-- {} -->", markup, "x".repeat(MIN_BODY_LEN))
    }

    #[tokio::test]
    async fn test_fetch_through_proxy() {
        let server = TestServer::html(&padded(LISTING)).await;
        let source = ScrapeSource::new(
            "https://github.com/GLOKADHI?tab=repositories",
            vec![format!("{}raw?url={{url}}", server.url())],
            8,
        )
        .unwrap();

        let repos = source.fetch(Duration::from_secs(2)).await.unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_short_body_falls_through_to_next_proxy() {
        let short = TestServer::html("<p>rate limited</p>").await;
        let good = TestServer::html(&padded(LISTING)).await;
        let source = ScrapeSource::new(
            "https://github.com/GLOKADHI?tab=repositories",
            vec![short.url(), good.url()],
            8,
        )
        .unwrap();

        let repos = source.fetch(Duration::from_secs(2)).await.unwrap();
        assert_eq!(repos[0].name, "alpha");
        assert_eq!(short.hits(), 1);
        assert_eq!(good.hits(), 1);
    }

    #[tokio::test]
    async fn test_error_status_and_timeout_yield_none() {
        let failing = TestServer::new(500, "text/html", &padded(LISTING)).await;
        let silent = silent_server().await;
        let source = ScrapeSource::new(
            "https://github.com/GLOKADHI?tab=repositories",
            vec![failing.url(), silent.url()],
            8,
        )
        .unwrap();

        let started = std::time::Instant::now();
        assert!(source.fetch(Duration::from_millis(200)).await.is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_markup_without_entries_yields_none() {
        let server = TestServer::html(&padded("<html><body>nothing</body></html>")).await;
        let source = ScrapeSource::new(
            "https://github.com/GLOKADHI?tab=repositories",
            vec![server.url()],
            8,
        )
        .unwrap();

        assert!(source.fetch(Duration::from_secs(2)).await.is_none());
    }
}
