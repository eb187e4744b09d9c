pub mod error;
pub mod models;
pub mod outline;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::{CompletionRequest, TextModel};
pub use outline::Outline;
pub use storage::{CachedTranscript, TranscriptCache};
pub use types::{
    domain_of, AnalysisOutcome, AnalysisParts, ArticleAnalysis, BatchAnalysis, ContentSource,
    ExternalLinkEntry, HeadingEntry, HeadingLevel, IdealStructure, KeywordFrequency,
    OutlineHeading, OutlineLevel, SearchResult, SearchResults, SourceKind,
};
