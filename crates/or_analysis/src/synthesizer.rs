use or_core::{ArticleAnalysis, IdealStructure, Result};
use or_inference::OutlineGenerator;

use crate::aggregate;

/// Turns competitor analyses into the recommended structure for a new article.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    outline: OutlineGenerator,
}

impl Synthesizer {
    pub fn new(outline: OutlineGenerator) -> Self {
        Self { outline }
    }

    /// Failed placeholder records are ignored.
    pub async fn synthesize(&self, analyses: &[ArticleAnalysis], focus_keyword: &str) -> Result<IdealStructure> {
        let usable: Vec<ArticleAnalysis> = analyses.iter().filter(|a| !a.is_failed()).cloned().collect();

        let target_word_count = aggregate::target_word_count(&usable);
        let recommended_keywords = aggregate::rank_keywords(&usable);
        let outline = self.outline.generate(focus_keyword, &usable, target_word_count).await?;

        Ok(IdealStructure {
            target_word_count,
            recommended_keywords,
            recommended_external_links: Vec::new(),
            suggested_titles: Vec::new(),
            suggested_descriptions: Vec::new(),
            outline,
        })
    }
}
