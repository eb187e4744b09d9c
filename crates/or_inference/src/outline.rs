//! Outline generation: prompt building and strict validation of the model's
//! JSON reply.

use or_core::{
    ArticleAnalysis, CompletionRequest, Error, Outline, OutlineHeading, OutlineLevel, Result, TextModel,
};
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are an expert SEO content strategist. Using the competitor analysis, design the ideal outline for a new article that will outrank every competitor.
Rules:
- Use only H2 and H3 headings. H3 headings may only appear as children of an H2.
- Cover every subtopic the competitors cover, plus anything they miss.
- Size the outline so the article can reach the target word count.
Respond with a single JSON object of the form:
{"headings": [{"level": "h2", "text": "...", "children": [{"level": "h3", "text": "..."}]}]}
Do not include explanations, only the JSON."#;

#[derive(Debug, Deserialize)]
struct RawOutline {
    #[serde(default)]
    headings: Option<Vec<RawHeading>>,
}

#[derive(Debug, Deserialize)]
struct RawHeading {
    #[serde(default)]
    level: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    children: Option<Vec<RawHeading>>,
}

#[derive(Debug, Clone)]
pub struct OutlineGenerator {
    model: Arc<dyn TextModel>,
}

impl OutlineGenerator {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub fn build_prompt(focus_keyword: &str, analyses: &[ArticleAnalysis], target_word_count: usize) -> String {
        let mut prompt = format!(
            "Focus keyword: {}\nTarget word count: {}\n\nCompetitor articles:\n",
            focus_keyword, target_word_count
        );
        for (i, analysis) in analyses.iter().enumerate() {
            let _ = writeln!(prompt, "\nArticle {}: {}", i + 1, analysis.title);
            if !analysis.meta_description.is_empty() {
                let _ = writeln!(prompt, "Description: {}", analysis.meta_description);
            }
            if analysis.headings_count() > 0 {
                let _ = writeln!(prompt, "Headings:");
                for heading in analysis.heading_structure() {
                    let _ = writeln!(prompt, "- {}: {}", heading.level.as_str(), heading.text);
                }
            }
            if !analysis.keywords.is_empty() {
                let _ = writeln!(prompt, "Keywords: {}", analysis.keywords.join(", "));
            }
        }
        prompt
    }

    pub async fn generate(
        &self,
        focus_keyword: &str,
        analyses: &[ArticleAnalysis],
        target_word_count: usize,
    ) -> Result<Vec<OutlineHeading>> {
        let request = CompletionRequest::new(
            SYSTEM_PROMPT,
            Self::build_prompt(focus_keyword, analyses, target_word_count),
        )
        .json()
        .with_temperature(0.4);

        let reply = self.model.complete(request).await?;
        let outline = parse_outline(&reply)?;
        tracing::info!("🧭 outline with {} sections for '{}'", outline.len(), focus_keyword);
        Ok(outline)
    }
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[newline + 1..],
        _ => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

fn parse_level(raw: &str) -> Option<OutlineLevel> {
    match raw.trim().to_lowercase().as_str() {
        "h2" => Some(OutlineLevel::H2),
        "h3" => Some(OutlineLevel::H3),
        _ => None,
    }
}

fn heading(raw: &RawHeading, id: String, path: &str) -> Result<OutlineHeading> {
    let level = parse_level(&raw.level)
        .ok_or_else(|| Error::OutlineParse(format!("heading {} has unsupported level '{}'", path, raw.level)))?;
    let text = raw.text.trim();
    if text.is_empty() {
        return Err(Error::OutlineParse(format!("heading {} has empty text", path)));
    }
    Ok(OutlineHeading {
        id,
        level,
        text: text.to_string(),
        children: None,
    })
}

/// Parses and validates a model reply, assigning positional ids
/// (`h2-1`, `h2-1-1`, ...).
pub fn parse_outline(reply: &str) -> Result<Vec<OutlineHeading>> {
    let raw: RawOutline = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| Error::OutlineParse(format!("reply is not valid outline JSON: {}", e)))?;
    let raw_headings = raw
        .headings
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::OutlineParse("outline has no headings".to_string()))?;

    let mut outline = Vec::with_capacity(raw_headings.len());
    for (i, raw_top) in raw_headings.iter().enumerate() {
        let path = format!("#{}", i + 1);
        let level_tag = parse_level(&raw_top.level).map(|l| match l {
            OutlineLevel::H2 => "h2",
            OutlineLevel::H3 => "h3",
        });
        let mut top = heading(raw_top, format!("{}-{}", level_tag.unwrap_or("h2"), i + 1), &path)?;

        let raw_children = raw_top.children.as_deref().unwrap_or(&[]);
        if !raw_children.is_empty() && top.level == OutlineLevel::H3 {
            return Err(Error::OutlineParse(format!("H3 heading {} cannot have children", path)));
        }

        let mut children = Vec::with_capacity(raw_children.len());
        for (j, raw_child) in raw_children.iter().enumerate() {
            let child_path = format!("{}.{}", path, j + 1);
            let child = heading(raw_child, format!("{}-{}", top.id, j + 1), &child_path)?;
            if child.level != OutlineLevel::H3 {
                return Err(Error::OutlineParse(format!("nested heading {} must be H3", child_path)));
            }
            if raw_child.children.as_ref().is_some_and(|c| !c.is_empty()) {
                return Err(Error::OutlineParse(format!("H3 heading {} cannot have children", child_path)));
            }
            children.push(child);
        }
        if !children.is_empty() {
            top.children = Some(children);
        }
        outline.push(top);
    }

    Outline::new(outline)
        .map(Outline::into_headings)
        .map_err(|e| Error::OutlineParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DummyModel;
    use or_core::{AnalysisParts, HeadingEntry, HeadingLevel};

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_assigns_positional_ids() {
        let reply = r#"```json
        {"headings": [
            {"id": "x", "level": "h2", "text": "Basics", "children": [
                {"level": "H3", "text": " Bins "},
                {"level": "h3", "text": "Worms"}
            ]},
            {"id": "x", "level": "h2", "text": "FAQ", "children": []}
        ]}
        ```"#;
        let outline = parse_outline(reply).unwrap();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].id, "h2-1");
        assert_eq!(outline[0].children()[0].id, "h2-1-1");
        assert_eq!(outline[0].children()[0].text, "Bins");
        assert_eq!(outline[0].children()[1].id, "h2-1-2");
        assert_eq!(outline[1].id, "h2-2");
        assert!(outline[1].children.is_none());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let cases = [
            "not json at all",
            r#"{"sections": []}"#,
            r#"{"headings": []}"#,
            r#"{"headings": [{"level": "h4", "text": "Deep"}]}"#,
            r#"{"headings": [{"level": "h2", "text": "  "}]}"#,
            r#"{"headings": [{"level": "h3", "text": "A", "children": [{"level": "h3", "text": "B"}]}]}"#,
            r#"{"headings": [{"level": "h2", "text": "A", "children": [{"level": "h2", "text": "B"}]}]}"#,
            r#"{"headings": [{"level": "h2", "text": "A", "children": [{"level": "h3", "text": "B", "children": [{"level": "h3", "text": "C"}]}]}]}"#,
        ];
        for reply in cases {
            assert!(
                matches!(parse_outline(reply), Err(Error::OutlineParse(_))),
                "accepted: {}",
                reply
            );
        }
    }

    #[test]
    fn test_prompt_embeds_competitors() {
        let analysis = ArticleAnalysis::new(AnalysisParts {
            title: "Compost at home".to_string(),
            meta_description: "A guide".to_string(),
            keywords: vec!["worm bin".to_string(), "bokashi".to_string()],
            heading_structure: vec![HeadingEntry { level: HeadingLevel::H2, text: "Getting started".to_string() }],
            ..Default::default()
        });
        let prompt = OutlineGenerator::build_prompt("indoor composting", &[analysis], 1800);
        assert!(prompt.contains("Focus keyword: indoor composting"));
        assert!(prompt.contains("Target word count: 1800"));
        assert!(prompt.contains("Article 1: Compost at home"));
        assert!(prompt.contains("- h2: Getting started"));
        assert!(prompt.contains("Keywords: worm bin, bokashi"));
    }

    #[tokio::test]
    async fn test_generate_with_dummy_model() {
        let generator = OutlineGenerator::new(Arc::new(DummyModel::new()));
        let outline = generator.generate("indoor composting", &[], 1500).await.unwrap();
        assert_eq!(outline[0].text, "What is indoor composting?");
        assert_eq!(outline[0].level, OutlineLevel::H2);
        assert_eq!(outline[0].children()[0].level, OutlineLevel::H3);
    }
}
