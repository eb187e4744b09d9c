use clap::Args;
use or_core::{ContentSource, Result};
use crate::fetchers::FetcherRegistry;

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// The URL to fetch
    pub url: String,
    /// Print the full body text instead of a preview
    #[arg(long)]
    pub body: bool,
    /// Only show which fetcher would handle the URL
    #[arg(long)]
    pub kind: bool,
}

pub async fn handle_command(args: FetchArgs, registry: &FetcherRegistry) -> Result<()> {
    if args.kind {
        let fetcher = registry.fetcher_for(&args.url)?;
        println!("{} -> {}", args.url, fetcher.kind());
        return Ok(());
    }
    let source = registry.fetch(&args.url).await?;
    println!("{}", summarize(&source, args.body));
    Ok(())
}

/// One-screen description of a fetched source.
pub fn summarize(source: &ContentSource, full_body: bool) -> String {
    let emoji = match source.kind {
        or_core::SourceKind::Article => "📰",
        or_core::SourceKind::Reddit => "💬",
        or_core::SourceKind::YouTube => "🎬",
    };
    let body = if full_body {
        source.body_text.clone()
    } else {
        let preview: String = source.body_text.chars().take(280).collect();
        if preview.len() < source.body_text.len() {
            format!("{}…", preview)
        } else {
            preview
        }
    };
    let mut out = format!("{} [{}] {}\n{}\n", emoji, source.kind, source.title, source.url);
    if let Some(description) = &source.meta_description {
        out.push_str(&format!("description: {}\n", description));
    }
    out.push_str(&format!(
        "body: {} chars, markup: {} chars\n\n{}",
        source.body_text.chars().count(),
        source.markup.len(),
        body
    ));
    out
}
