use chrono::Utc;
use or_core::{AnalysisOutcome, ArticleAnalysis, BatchAnalysis, Error, Result, TextModel};
use or_fetchers::{FetcherRegistry, Logger};
use or_inference::{KeywordExtractor, OutlineGenerator};
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::{Analyzer, ArticleAnalyzer};
use crate::orchestrator::Orchestrator;
use crate::synthesizer::Synthesizer;

/// What to do when some URLs of a batch cannot be analyzed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Any failure fails the batch.
    #[default]
    FailFast,
    /// Failed URLs become placeholder records; only a batch where every URL
    /// fails is an error.
    Partial,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_attempts: u32,
    /// Sleep before retry `n` is `backoff_step * n`.
    pub backoff_step: Duration,
    pub policy: BatchPolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
            policy: BatchPolicy::FailFast,
        }
    }
}

/// Entry point for a whole analysis run: fan-out, then synthesis, retried as a unit.
#[derive(Clone)]
pub struct BatchRunner {
    orchestrator: Orchestrator,
    synthesizer: Synthesizer,
    config: BatchConfig,
    logger: Logger,
}

impl BatchRunner {
    pub fn new(analyzer: Arc<dyn Analyzer>, model: Arc<dyn TextModel>, config: BatchConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(analyzer),
            synthesizer: Synthesizer::new(OutlineGenerator::new(model)),
            config,
            logger: Logger::new().with_prefix("[pipeline]"),
        }
    }

    /// Wires the default article analyzer over `fetchers`, sharing `model`
    /// between keyword extraction and outline generation.
    pub fn from_parts(fetchers: FetcherRegistry, model: Arc<dyn TextModel>, config: BatchConfig) -> Self {
        let analyzer = ArticleAnalyzer::new(fetchers, KeywordExtractor::new(model.clone()));
        Self::new(Arc::new(analyzer), model, config)
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub async fn run_batch_analysis(&self, urls: &[String], focus_keyword: &str) -> Result<BatchAnalysis> {
        self.run_with_policy(urls, focus_keyword, self.config.policy).await
    }

    pub async fn run_with_policy(
        &self,
        urls: &[String],
        focus_keyword: &str,
        policy: BatchPolicy,
    ) -> Result<BatchAnalysis> {
        if urls.is_empty() {
            return Err(Error::InvalidSource("no URLs to analyze".to_string()));
        }
        if focus_keyword.trim().is_empty() {
            return Err(Error::InvalidSource("focus keyword is empty".to_string()));
        }

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.run_once(urls, focus_keyword, policy).await {
                Ok(batch) => {
                    self.logger.attempt(attempt, max_attempts, "✅ batch analysis complete");
                    return Ok(batch);
                }
                Err(e) if attempt < max_attempts && is_retryable(&e) => {
                    let delay = self.config.backoff_step * attempt;
                    self.logger
                        .attempt(attempt, max_attempts, &format!("⏳ {}; retrying in {:?}", e, delay));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    self.logger.attempt(attempt, max_attempts, &format!("❌ {}; giving up", e));
                    return Err(e);
                }
            }
        }
    }

    async fn run_once(&self, urls: &[String], focus_keyword: &str, policy: BatchPolicy) -> Result<BatchAnalysis> {
        let analyses = match policy {
            BatchPolicy::FailFast => self.orchestrator.analyze_all(urls, focus_keyword).await?,
            BatchPolicy::Partial => {
                settle(self.orchestrator.analyze_all_settled(urls, focus_keyword).await)?
            }
        };
        let ideal_structure = self.synthesizer.synthesize(&analyses, focus_keyword).await?;
        Ok(BatchAnalysis {
            analyses,
            ideal_structure,
            generated_at: Utc::now(),
        })
    }
}

/// Missing configuration and unusable URLs fail the same way on every attempt.
fn is_retryable(error: &Error) -> bool {
    !matches!(error.root_cause(), Error::Config(_) | Error::InvalidSource(_))
}

/// Converts outcomes to records, failing only when nothing succeeded.
fn settle(outcomes: Vec<AnalysisOutcome>) -> Result<Vec<ArticleAnalysis>> {
    if outcomes.iter().all(|o| matches!(o, AnalysisOutcome::Failed { .. })) {
        let first = outcomes.into_iter().find_map(|o| match o {
            AnalysisOutcome::Failed { reason, .. } => Some(reason),
            AnalysisOutcome::Analyzed(_) => None,
        });
        let reason = first.unwrap_or_else(|| Error::InvalidSource("no URLs to analyze".to_string()));
        return Err(Error::BatchAnalysis(Box::new(reason)));
    }
    Ok(outcomes
        .into_iter()
        .map(|outcome| match outcome {
            AnalysisOutcome::Analyzed(analysis) => analysis,
            AnalysisOutcome::Failed { url, reason } => ArticleAnalysis::failed(&url, reason.to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use or_core::AnalysisParts;
    use or_inference::models::DummyModel;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails every URL containing "down", and everything until `heal_after` calls were made.
    /// URLs containing "untokened" fail with a configuration error.
    struct FlakyAnalyzer {
        calls: AtomicU32,
        heal_after: u32,
    }

    #[async_trait]
    impl Analyzer for FlakyAnalyzer {
        async fn analyze(&self, url: &str, _focus_keyword: &str) -> Result<ArticleAnalysis> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if url.contains("untokened") {
                return Err(Error::Config("extraction API token is not configured".to_string()));
            }
            if url.contains("down") || call <= self.heal_after {
                return Err(Error::fetch(url, Some(503), "unavailable"));
            }
            Ok(ArticleAnalysis::new(AnalysisParts {
                url: url.to_string(),
                word_count: 800,
                keywords: vec!["compost".to_string()],
                ..Default::default()
            }))
        }
    }

    fn runner(heal_after: u32, policy: BatchPolicy) -> (BatchRunner, Arc<FlakyAnalyzer>) {
        let analyzer = Arc::new(FlakyAnalyzer { calls: AtomicU32::new(0), heal_after });
        let config = BatchConfig {
            max_attempts: 3,
            backoff_step: Duration::from_millis(5),
            policy,
        };
        (BatchRunner::new(analyzer.clone(), Arc::new(DummyModel::new()), config), analyzer)
    }

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_whole_batch_is_retried() {
        let (runner, analyzer) = runner(1, BatchPolicy::FailFast);
        let batch = runner
            .run_batch_analysis(&urls(&["https://a.test/1", "https://b.test/2"]), "compost")
            .await
            .unwrap();
        assert_eq!(batch.analyses.len(), 2);
        assert_eq!(batch.ideal_structure.target_word_count, 800);
        // first attempt: 2 calls, one failing; second attempt: 2 more calls
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (runner, analyzer) = runner(0, BatchPolicy::FailFast);
        let err = runner
            .run_batch_analysis(&urls(&["https://a.test/1", "https://down.test/2"]), "compost")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BatchAnalysis(_)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_config_errors_are_not_retried() {
        let (runner, analyzer) = runner(0, BatchPolicy::FailFast);
        let err = runner
            .run_batch_analysis(&urls(&["https://a.test/1", "https://untokened.test/2"]), "compost")
            .await
            .unwrap_err();
        assert!(matches!(err.root_cause(), Error::Config(_)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_partial_policy_keeps_failures_as_records() {
        let (runner, _) = runner(0, BatchPolicy::Partial);
        let batch = runner
            .run_batch_analysis(&urls(&["https://down.test/1", "https://a.test/2"]), "compost")
            .await
            .unwrap();
        assert_eq!(batch.analyses.len(), 2);
        assert!(batch.analyses[0].is_failed());
        assert_eq!(batch.analyses[0].url, "https://down.test/1");
        assert!(!batch.analyses[1].is_failed());
        assert_eq!(batch.ideal_structure.target_word_count, 800);
    }

    #[tokio::test]
    async fn test_partial_policy_fails_when_everything_fails() {
        let (runner, _) = runner(0, BatchPolicy::Partial);
        let err = runner
            .run_with_policy(&urls(&["https://down.test/1"]), "compost", BatchPolicy::Partial)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BatchAnalysis(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty_input() {
        let (runner, analyzer) = runner(0, BatchPolicy::FailFast);
        assert!(matches!(runner.run_batch_analysis(&[], "compost").await, Err(Error::InvalidSource(_))));
        assert!(matches!(
            runner.run_batch_analysis(&urls(&["https://a.test/"]), "  ").await,
            Err(Error::InvalidSource(_))
        ));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }
}
