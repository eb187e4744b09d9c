use or_core::{CompletionRequest, Error, Result, TextModel};
use std::sync::Arc;

/// Only the head of long bodies is sent to the model.
pub const MAX_CONTENT_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "You are an SEO analyst. Extract the 5 to 7 most important keywords \
or key phrases from the content. Prefer phrases that are mentioned frequently and are topically \
relevant to the focus keyword. Return one keyword per line as clean phrases, with no bullets, \
numbering, quotes or commentary.";

/// Asks a text model for the main keywords of an article body.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    model: Arc<dyn TextModel>,
}

impl KeywordExtractor {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    pub fn build_prompt(body: &str, focus_keyword: &str) -> String {
        format!(
            "Focus keyword: {}\n\nContent:\n{}",
            focus_keyword,
            truncate_chars(body, MAX_CONTENT_CHARS)
        )
    }

    /// A blank body has no keywords and never reaches the model.
    pub async fn extract(&self, body: &str, focus_keyword: &str) -> Result<Vec<String>> {
        if body.trim().is_empty() {
            tracing::debug!("🔑 blank body, no keywords to extract");
            return Ok(Vec::new());
        }
        let request = CompletionRequest::new(SYSTEM_PROMPT, Self::build_prompt(body, focus_keyword))
            .with_temperature(0.2);
        let reply = self.model.complete(request).await.map_err(|e| {
            Error::KeywordExtraction(format!("{} model failed: {}", self.model.name(), e))
        })?;

        let keywords = parse_keyword_lines(&reply);
        if keywords.is_empty() {
            return Err(Error::KeywordExtraction(
                "model returned no usable keywords".to_string(),
            ));
        }
        tracing::debug!("🔑 extracted {} keywords", keywords.len());
        Ok(keywords)
    }
}

/// Prefix of at most `max` characters, cut on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// One keyword per non-empty line, with list markers removed.
pub fn parse_keyword_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•', '–']).trim_start();

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }
    line.trim()
}
