pub mod aggregate;
pub mod analyzer;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod pipeline;
pub mod synthesizer;

pub use aggregate::{aggregate_external_links, rank_keywords, target_word_count};
pub use analyzer::{Analyzer, ArticleAnalyzer};
pub use orchestrator::Orchestrator;
pub use parser::{parse, ParsedContent};
pub use pipeline::{BatchConfig, BatchPolicy, BatchRunner};
pub use synthesizer::Synthesizer;

pub mod prelude {
    pub use super::analyzer::Analyzer;
    pub use super::pipeline::{BatchConfig, BatchPolicy, BatchRunner};
    pub use or_core::{ArticleAnalysis, BatchAnalysis, Error, IdealStructure, Result};
}
