use or_core::{ArticleAnalysis, ExternalLinkEntry, KeywordFrequency};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_TARGET_WORD_COUNT: usize = 1500;

/// Rounded mean of the non-zero word counts.
pub fn target_word_count(analyses: &[ArticleAnalysis]) -> usize {
    let counts: Vec<usize> = analyses
        .iter()
        .map(|a| a.word_count)
        .filter(|&count| count > 0)
        .collect();
    if counts.is_empty() {
        return DEFAULT_TARGET_WORD_COUNT;
    }
    let total: usize = counts.iter().sum();
    (total as f64 / counts.len() as f64).round() as usize
}

#[derive(Default)]
struct Tally {
    articles: HashSet<usize>,
    mentions: usize,
}

impl Tally {
    fn record(&mut self, article: usize) {
        self.articles.insert(article);
        self.mentions += 1;
    }
}

/// Frequency desc, mentions desc, shorter phrase first, then alphabetical.
fn rank_order(a: (&str, usize, usize), b: (&str, usize, usize)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| b.2.cmp(&a.2))
        .then_with(|| a.0.chars().count().cmp(&b.0.chars().count()))
        .then_with(|| a.0.cmp(b.0))
}

/// Groups keywords case-insensitively. `frequency` counts distinct articles,
/// `total_mentions` counts every occurrence.
pub fn rank_keywords(analyses: &[ArticleAnalysis]) -> Vec<KeywordFrequency> {
    let mut tallies: HashMap<String, Tally> = HashMap::new();
    for (index, analysis) in analyses.iter().enumerate() {
        for keyword in &analysis.keywords {
            let normalized = keyword.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            tallies.entry(normalized).or_default().record(index);
        }
    }

    let mut ranked: Vec<KeywordFrequency> = tallies
        .into_iter()
        .map(|(keyword, tally)| KeywordFrequency {
            keyword,
            frequency: tally.articles.len(),
            total_mentions: tally.mentions,
        })
        .collect();
    ranked.sort_by(|a, b| {
        rank_order(
            (a.keyword.as_str(), a.frequency, a.total_mentions),
            (b.keyword.as_str(), b.frequency, b.total_mentions),
        )
    });
    ranked
}

/// Groups external links by URL and ranks them like keywords. The first
/// anchor text seen for a URL is kept.
pub fn aggregate_external_links(analyses: &[ArticleAnalysis]) -> Vec<ExternalLinkEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, (ExternalLinkEntry, Tally)> = HashMap::new();
    for (index, analysis) in analyses.iter().enumerate() {
        for link in analysis.external_links() {
            let (_, tally) = grouped.entry(link.url.clone()).or_insert_with(|| {
                order.push(link.url.clone());
                (link.clone(), Tally::default())
            });
            tally.record(index);
        }
    }

    let mut links: Vec<ExternalLinkEntry> = order
        .into_iter()
        .filter_map(|url| grouped.remove(&url))
        .map(|(mut link, tally)| {
            link.frequency = Some(tally.articles.len());
            link.total_mentions = Some(tally.mentions);
            link
        })
        .collect();
    links.sort_by(|a, b| {
        rank_order(
            (a.url.as_str(), a.frequency.unwrap_or(0), a.total_mentions.unwrap_or(0)),
            (b.url.as_str(), b.frequency.unwrap_or(0), b.total_mentions.unwrap_or(0)),
        )
    });
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use or_core::AnalysisParts;

    fn with_keywords(keywords: &[&str]) -> ArticleAnalysis {
        ArticleAnalysis::new(AnalysisParts {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        })
    }

    fn with_words(count: usize) -> ArticleAnalysis {
        ArticleAnalysis::new(AnalysisParts {
            word_count: count,
            ..Default::default()
        })
    }

    fn with_links(external_links: Vec<ExternalLinkEntry>) -> ArticleAnalysis {
        ArticleAnalysis::new(AnalysisParts {
            word_count: 10,
            external_links,
            ..Default::default()
        })
    }

    fn link(url: &str, anchor: &str) -> ExternalLinkEntry {
        ExternalLinkEntry {
            url: url.to_string(),
            anchor_text: anchor.to_string(),
            domain: or_core::domain_of(url).unwrap_or_default(),
            frequency: None,
            total_mentions: None,
        }
    }

    #[test]
    fn test_target_word_count_ignores_zero() {
        let analyses = vec![with_words(1000), with_words(0), with_words(2000)];
        assert_eq!(target_word_count(&analyses), 1500);
        assert_eq!(target_word_count(&[with_words(1), with_words(2)]), 2);
        assert_eq!(target_word_count(&[]), 1500);
        assert_eq!(target_word_count(&[with_words(0)]), 1500);
    }

    #[test]
    fn test_rank_by_frequency() {
        let analyses = vec![with_keywords(&["x", "y"]), with_keywords(&["x"]), with_keywords(&["y", "z"])];
        let ranked = rank_keywords(&analyses);
        let order: Vec<&str> = ranked.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
        assert_eq!(ranked[0].frequency, 2);
        assert_eq!(ranked[2].frequency, 1);
    }

    #[test]
    fn test_shorter_phrase_wins_ties() {
        let analyses = vec![
            with_keywords(&["worm composting", "bokashi"]),
            with_keywords(&["bokashi", "Worm Composting "]),
        ];
        let ranked = rank_keywords(&analyses);
        assert_eq!(ranked[0].keyword, "bokashi");
        assert_eq!(ranked[1].keyword, "worm composting");
        assert_eq!(ranked[1].frequency, 2);
    }

    #[test]
    fn test_total_mentions_counts_duplicates() {
        let analyses = vec![with_keywords(&["bin", "Bin", " "]), with_keywords(&["bin", "soil"])];
        let ranked = rank_keywords(&analyses);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], KeywordFrequency { keyword: "bin".to_string(), frequency: 2, total_mentions: 3 });
    }

    #[test]
    fn test_aggregate_external_links() {
        let a = with_links(vec![link("https://epa.gov/compost", "EPA"), link("https://epa.gov/compost", "again")]);
        let b = with_links(vec![link("https://epa.gov/compost", "guide"), link("https://x.org/a", "x")]);
        assert_eq!(a.external_links_count(), 2);

        let links = aggregate_external_links(&[a, b]);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://epa.gov/compost");
        assert_eq!(links[0].anchor_text, "EPA");
        assert_eq!(links[0].frequency, Some(2));
        assert_eq!(links[0].total_mentions, Some(3));
        assert_eq!(links[1].frequency, Some(1));
    }
}
