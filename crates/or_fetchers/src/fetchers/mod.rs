use async_trait::async_trait;
use or_core::{ContentSource, Error, Result, SourceKind, TranscriptCache};
use std::sync::Arc;
use url::Url;

use crate::config::FetchConfig;

pub mod article;
pub mod reddit;
pub mod youtube;

pub use article::ArticleFetcher;
pub use reddit::RedditFetcher;
pub use youtube::YouTubeFetcher;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the kind of source this fetcher produces
    fn kind(&self) -> SourceKind;

    /// Returns true if this fetcher can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Retrieves raw content for the given URL
    async fn fetch(&self, url: &str) -> Result<ContentSource>;
}

/// Ordered set of fetchers; the first one accepting a URL handles it.
#[derive(Clone, Default)]
pub struct FetcherRegistry {
    fetchers: Vec<Arc<dyn Fetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self { fetchers: Vec::new() }
    }

    /// Reddit and YouTube first, then the generic article fetcher as catch-all.
    pub fn with_defaults(config: FetchConfig, cache: Arc<dyn TranscriptCache>) -> Result<Self> {
        let config = Arc::new(config);
        let mut registry = Self::new();
        registry.add_fetcher(Arc::new(RedditFetcher::new(config.clone())?));
        registry.add_fetcher(Arc::new(YouTubeFetcher::new(config.clone(), cache)?));
        registry.add_fetcher(Arc::new(ArticleFetcher::new(config)?));
        Ok(registry)
    }

    pub fn add_fetcher(&mut self, fetcher: Arc<dyn Fetcher>) {
        self.fetchers.push(fetcher);
    }

    pub fn kinds(&self) -> Vec<SourceKind> {
        self.fetchers.iter().map(|f| f.kind()).collect()
    }

    pub fn fetcher_for(&self, url: &str) -> Result<Arc<dyn Fetcher>> {
        if utils::parse_url(url).is_err() {
            return Err(Error::InvalidSource(format!("Not a fetchable URL: {}", url)));
        }
        self.fetchers
            .iter()
            .find(|f| f.can_handle(url))
            .cloned()
            .ok_or_else(|| Error::InvalidSource(format!("No fetcher found for URL: {}", url)))
    }

    pub async fn fetch(&self, url: &str) -> Result<ContentSource> {
        self.fetcher_for(url)?.fetch(url).await
    }
}

/// Common utilities for fetchers
pub(crate) mod utils {
    use super::*;

    pub fn parse_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::InvalidSource(format!("Failed to parse URL {}: {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(Error::InvalidSource(format!("Unsupported scheme {} in {}", other, url))),
        }
    }

    pub fn escape_html(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// Builds a minimal HTML document so non-article sources can go through
    /// the same parser as web pages.
    pub fn render_markup<'a>(title: &str, paragraphs: impl IntoIterator<Item = &'a str>) -> String {
        let mut html = format!("<article><h1>{}</h1>", escape_html(title));
        for paragraph in paragraphs {
            let paragraph = paragraph.trim();
            if !paragraph.is_empty() {
                html.push_str(&format!("<p>{}</p>", escape_html(paragraph)));
            }
        }
        html.push_str("</article>");
        html
    }

    pub fn split_into_paragraphs(content: &str) -> Vec<&str> {
        content
            .split("\n\n")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::utils;

    struct StaticFetcher(SourceKind, &'static str);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        fn kind(&self) -> SourceKind {
            self.0
        }

        fn can_handle(&self, url: &str) -> bool {
            url.contains(self.1)
        }

        async fn fetch(&self, url: &str) -> Result<ContentSource> {
            Ok(ContentSource {
                kind: self.0,
                url: url.to_string(),
                title: self.1.to_string(),
                body_text: String::new(),
                markup: String::new(),
                meta_description: None,
            })
        }
    }

    #[test]
    fn test_parse_url() {
        assert!(utils::parse_url("https://example.com").is_ok());
        assert!(utils::parse_url("ftp://example.com").is_err());
        assert!(utils::parse_url("invalid-url").is_err());
    }

    #[test]
    fn test_render_markup_escapes() {
        let html = utils::render_markup("Tips & <tricks>", ["first", "  ", "second"]);
        assert_eq!(
            html,
            "<article><h1>Tips &amp; &lt;tricks&gt;</h1><p>first</p><p>second</p></article>"
        );
    }

    #[test]
    fn test_split_into_paragraphs() {
        let content = "Section 1\n\nSection 2\n\n\nSection 3";
        assert_eq!(utils::split_into_paragraphs(content), vec!["Section 1", "Section 2", "Section 3"]);
    }

    #[tokio::test]
    async fn test_registry_picks_first_match() {
        let mut registry = FetcherRegistry::new();
        registry.add_fetcher(Arc::new(StaticFetcher(SourceKind::Reddit, "reddit.com")));
        registry.add_fetcher(Arc::new(StaticFetcher(SourceKind::Article, "")));

        let source = registry.fetch("https://www.reddit.com/r/x/comments/1/y").await.unwrap();
        assert_eq!(source.kind, SourceKind::Reddit);

        let source = registry.fetch("https://example.com/post").await.unwrap();
        assert_eq!(source.kind, SourceKind::Article);

        assert!(matches!(registry.fetch("not a url").await, Err(Error::InvalidSource(_))));
    }

    #[test]
    fn test_empty_registry_rejects() {
        let registry = FetcherRegistry::new();
        assert!(registry.fetcher_for("https://example.com").is_err());
        assert!(registry.kinds().is_empty());
    }
}
