use async_trait::async_trait;
use or_core::{CompletionRequest, Result, TextModel};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;

/// Offline stand-in for a real model. Keyword prompts get the most frequent
/// words of the content; JSON prompts get a small outline built around the
/// focus keyword.
#[derive(Default)]
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }

    fn focus_keyword(prompt: &str) -> String {
        prompt
            .lines()
            .find_map(|line| line.strip_prefix("Focus keyword:"))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| "the topic".to_string())
    }

    fn frequent_words(prompt: &str) -> Vec<String> {
        let content = prompt.split_once("Content:").map(|(_, c)| c).unwrap_or(prompt);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for word in content.split(|c: char| !c.is_alphanumeric()) {
            if word.chars().count() >= 4 {
                *counts.entry(word.to_lowercase()).or_insert(0) += 1;
            }
        }
        let mut words: Vec<(String, usize)> = counts.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.into_iter().take(6).map(|(w, _)| w).collect()
    }

    fn outline(keyword: &str) -> String {
        json!({
            "headings": [
                {"level": "h2", "text": format!("What is {}?", keyword), "children": [
                    {"level": "h3", "text": "Key terms"},
                    {"level": "h3", "text": "Why it matters"}
                ]},
                {"level": "h2", "text": format!("How to get started with {}", keyword), "children": [
                    {"level": "h3", "text": "Equipment"},
                    {"level": "h3", "text": "Step-by-step"}
                ]},
                {"level": "h2", "text": "Common mistakes"},
                {"level": "h2", "text": "FAQ"}
            ]
        })
        .to_string()
    }
}

#[async_trait]
impl TextModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        if request.json {
            Ok(Self::outline(&Self::focus_keyword(&request.prompt)))
        } else {
            Ok(Self::frequent_words(&request.prompt).join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_keywords() {
        let model = DummyModel::new();
        let prompt = "Focus keyword: compost\n\nContent:\nWorms love compost. Compost needs worms and browns.";
        let reply = model.complete(CompletionRequest::new("sys", prompt)).await.unwrap();
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "compost");
        assert_eq!(lines[1], "worms");
        assert!(lines.len() <= 6);
    }

    #[tokio::test]
    async fn test_dummy_outline_is_json() {
        let model = DummyModel::new();
        let reply = model
            .complete(CompletionRequest::new("sys", "Focus keyword: indoor composting").json())
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["headings"][0]["text"], "What is indoor composting?");
        assert_eq!(value["headings"][0]["children"][0]["level"], "h3");
    }
}
