use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Category of content origin; decides which fetcher handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Article,
    Reddit,
    YouTube,
}

impl SourceKind {
    pub fn from_url(url: &str) -> Self {
        let host = match Url::parse(url) {
            Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
            Err(_) => return SourceKind::Article,
        };
        let matches = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));

        if matches("reddit.com") || matches("redd.it") {
            SourceKind::Reddit
        } else if matches("youtube.com") || matches("youtu.be") {
            SourceKind::YouTube
        } else {
            SourceKind::Article
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Article => write!(f, "article"),
            SourceKind::Reddit => write!(f, "reddit"),
            SourceKind::YouTube => write!(f, "youtube"),
        }
    }
}

/// Host of `url` in lowercase with any leading `www.` removed.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Raw content as returned by a fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSource {
    pub kind: SourceKind,
    pub url: String,
    pub title: String,
    pub body_text: String,
    /// HTML for articles; synthesized HTML for Reddit threads and video transcripts.
    pub markup: String,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "h1" => Some(HeadingLevel::H1),
            "h2" => Some(HeadingLevel::H2),
            "h3" => Some(HeadingLevel::H3),
            "h4" => Some(HeadingLevel::H4),
            "h5" => Some(HeadingLevel::H5),
            "h6" => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    pub level: HeadingLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLinkEntry {
    pub url: String,
    pub anchor_text: String,
    pub domain: String,
    /// Number of distinct articles linking here. Set during aggregation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub frequency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total_mentions: Option<usize>,
}

/// Normalized analysis of one source URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleAnalysis {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub word_count: usize,
    pub character_count: usize,
    headings_count: usize,
    pub paragraphs_count: usize,
    pub images_count: usize,
    pub videos_count: usize,
    external_links: Vec<ExternalLinkEntry>,
    external_links_count: usize,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub readability_score: f64,
    heading_structure: Vec<HeadingEntry>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Everything an `ArticleAnalysis` is assembled from. The two count fields
/// tied to vectors are derived, never supplied.
#[derive(Debug, Clone, Default)]
pub struct AnalysisParts {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub word_count: usize,
    pub character_count: usize,
    pub paragraphs_count: usize,
    pub images_count: usize,
    pub videos_count: usize,
    pub external_links: Vec<ExternalLinkEntry>,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub readability_score: f64,
    pub heading_structure: Vec<HeadingEntry>,
}

impl ArticleAnalysis {
    pub fn new(parts: AnalysisParts) -> Self {
        Self {
            headings_count: parts.heading_structure.len(),
            external_links_count: parts.external_links.len(),
            title: parts.title,
            url: parts.url,
            domain: parts.domain,
            word_count: parts.word_count,
            character_count: parts.character_count,
            paragraphs_count: parts.paragraphs_count,
            images_count: parts.images_count,
            videos_count: parts.videos_count,
            external_links: parts.external_links,
            meta_title: parts.meta_title,
            meta_description: parts.meta_description,
            keywords: parts.keywords,
            readability_score: parts.readability_score,
            heading_structure: parts.heading_structure,
            error: None,
        }
    }

    /// Placeholder record for a URL whose analysis failed.
    pub fn failed(url: &str, reason: impl Into<String>) -> Self {
        let mut analysis = Self::new(AnalysisParts {
            url: url.to_string(),
            domain: domain_of(url).unwrap_or_default(),
            ..Default::default()
        });
        analysis.error = Some(reason.into());
        analysis
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn heading_structure(&self) -> &[HeadingEntry] {
        &self.heading_structure
    }

    pub fn headings_count(&self) -> usize {
        self.headings_count
    }

    pub fn external_links(&self) -> &[ExternalLinkEntry] {
        &self.external_links
    }

    pub fn external_links_count(&self) -> usize {
        self.external_links_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordFrequency {
    pub keyword: String,
    pub frequency: usize,
    pub total_mentions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineLevel {
    H2,
    H3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineHeading {
    pub id: String,
    pub level: OutlineLevel,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub children: Option<Vec<OutlineHeading>>,
}

impl OutlineHeading {
    pub fn children(&self) -> &[OutlineHeading] {
        self.children.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdealStructure {
    pub target_word_count: usize,
    pub recommended_keywords: Vec<KeywordFrequency>,
    pub recommended_external_links: Vec<ExternalLinkEntry>,
    pub suggested_titles: Vec<String>,
    pub suggested_descriptions: Vec<String>,
    pub outline: Vec<OutlineHeading>,
}

/// Result of one `run_batch_analysis` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalysis {
    pub analyses: Vec<ArticleAnalysis>,
    pub ideal_structure: IdealStructure,
    pub generated_at: DateTime<Utc>,
}

/// Per-URL outcome when partial results are kept.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Analyzed(ArticleAnalysis),
    Failed { url: String, reason: crate::Error },
}

impl AnalysisOutcome {
    pub fn url(&self) -> &str {
        match self {
            AnalysisOutcome::Analyzed(analysis) => &analysis.url,
            AnalysisOutcome::Failed { url, .. } => url,
        }
    }
}

/// A search result the user may pick for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub rank: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    pub position: u32,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Payload returned by the upstream search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
}

impl SearchResults {
    pub fn into_articles(self) -> Vec<SearchResult> {
        let mut articles: Vec<SearchResult> = self
            .organic_results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
                rank: r.position,
            })
            .collect();
        articles.sort_by_key(|a| a.rank);
        articles
    }
}
