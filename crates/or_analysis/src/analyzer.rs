use async_trait::async_trait;
use or_core::{domain_of, AnalysisParts, ArticleAnalysis, Error, Result};
use or_fetchers::FetcherRegistry;
use or_inference::KeywordExtractor;

use crate::metrics;
use crate::parser;

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Produces the full analysis of one URL
    async fn analyze(&self, url: &str, focus_keyword: &str) -> Result<ArticleAnalysis>;
}

/// Fetch, parse, extract keywords, assemble. Any stage error aborts the URL.
#[derive(Clone)]
pub struct ArticleAnalyzer {
    fetchers: FetcherRegistry,
    keywords: KeywordExtractor,
}

impl ArticleAnalyzer {
    pub fn new(fetchers: FetcherRegistry, keywords: KeywordExtractor) -> Self {
        Self { fetchers, keywords }
    }
}

#[async_trait]
impl Analyzer for ArticleAnalyzer {
    async fn analyze(&self, url: &str, focus_keyword: &str) -> Result<ArticleAnalysis> {
        let domain = domain_of(url)
            .ok_or_else(|| Error::InvalidSource(format!("URL has no domain: {}", url)))?;

        let source = self.fetchers.fetch(url).await?;
        let parsed = parser::parse(&source, &domain);
        let keywords = self.keywords.extract(&parsed.plain_text, focus_keyword).await?;

        let title = if source.title.trim().is_empty() {
            parsed.meta_title.clone()
        } else {
            source.title.clone()
        };
        tracing::debug!(
            "📄 {} analyzed: {} words, {} headings, {} external links",
            url,
            metrics::word_count(&parsed.plain_text),
            parsed.headings.len(),
            parsed.external_links.len()
        );

        Ok(ArticleAnalysis::new(AnalysisParts {
            title,
            url: url.to_string(),
            domain,
            word_count: metrics::word_count(&parsed.plain_text),
            character_count: metrics::character_count(&parsed.plain_text),
            paragraphs_count: parsed.paragraphs_count,
            images_count: parsed.images_count,
            videos_count: parsed.videos_count,
            external_links: parsed.external_links,
            meta_title: parsed.meta_title,
            meta_description: parsed.meta_description,
            keywords,
            readability_score: metrics::readability_score(&parsed.plain_text),
            heading_structure: parsed.headings,
        }))
    }
}
