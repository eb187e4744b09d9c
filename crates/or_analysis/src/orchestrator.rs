use futures::future::join_all;
use or_core::{AnalysisOutcome, ArticleAnalysis, Error, Result};
use or_fetchers::Logger;
use std::sync::Arc;
use std::time::Instant;

use crate::analyzer::Analyzer;

/// Runs one analysis per URL concurrently. Output order always matches input order.
#[derive(Clone)]
pub struct Orchestrator {
    analyzer: Arc<dyn Analyzer>,
    logger: Logger,
}

impl Orchestrator {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            analyzer,
            logger: Logger::new().with_prefix("[batch]"),
        }
    }

    async fn run(&self, urls: &[String], focus_keyword: &str) -> Vec<Result<ArticleAnalysis>> {
        let started = Instant::now();
        self.logger.info(&format!("🚀 analyzing {} URLs for '{}'", urls.len(), focus_keyword));

        let results = join_all(
            urls.iter()
                .map(|url| self.analyzer.analyze(url, focus_keyword)),
        )
        .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        self.logger.info(&format!(
            "🏁 {} analyzed, {} failed in {:.2?}",
            results.len() - failed,
            failed,
            started.elapsed()
        ));
        results
    }

    /// Fails with `Error::BatchAnalysis` wrapping the first failure in input order.
    pub async fn analyze_all(&self, urls: &[String], focus_keyword: &str) -> Result<Vec<ArticleAnalysis>> {
        let mut analyses = Vec::with_capacity(urls.len());
        for (url, result) in urls.iter().zip(self.run(urls, focus_keyword).await) {
            match result {
                Ok(analysis) => analyses.push(analysis),
                Err(e) => {
                    self.logger.error(&format!("❌ {} failed: {}", url, e));
                    return Err(Error::BatchAnalysis(Box::new(e)));
                }
            }
        }
        Ok(analyses)
    }

    /// Keeps every per-URL outcome instead of failing the batch.
    pub async fn analyze_all_settled(&self, urls: &[String], focus_keyword: &str) -> Vec<AnalysisOutcome> {
        urls.iter()
            .zip(self.run(urls, focus_keyword).await)
            .map(|(url, result)| match result {
                Ok(analysis) => AnalysisOutcome::Analyzed(analysis),
                Err(reason) => {
                    self.logger.warn(&format!("⚠️ {} failed: {}", url, reason));
                    AnalysisOutcome::Failed { url: url.clone(), reason }
                }
            })
            .collect()
    }
}
