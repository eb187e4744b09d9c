use or_core::{domain_of, ContentSource, ExternalLinkEntry, HeadingEntry, HeadingLevel};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Structural facts extracted from a source's markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContent {
    pub headings: Vec<HeadingEntry>,
    pub external_links: Vec<ExternalLinkEntry>,
    pub paragraphs_count: usize,
    pub images_count: usize,
    pub videos_count: usize,
    pub meta_title: String,
    pub meta_description: String,
    pub plain_text: String,
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn count(document: &Html, css: &str) -> usize {
    selector(css).map(|s| document.select(&s).count()).unwrap_or(0)
}

fn normalized_text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn headings(document: &Html) -> Vec<HeadingEntry> {
    let Some(selector) = selector("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|element| {
            let level = HeadingLevel::from_tag(element.value().name())?;
            Some(HeadingEntry {
                level,
                text: normalized_text(element),
            })
        })
        .collect()
}

fn resolve(base: Option<&Url>, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let resolved = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    resolved.host_str()?;
    Some(resolved)
}

fn external_links(document: &Html, source_url: &str, current_domain: &str) -> Vec<ExternalLinkEntry> {
    let Some(selector) = selector("a[href]") else {
        return Vec::new();
    };
    let base = Url::parse(source_url).ok();
    document
        .select(&selector)
        .filter_map(|anchor| {
            let url = resolve(base.as_ref(), anchor.value().attr("href")?)?;
            let domain = domain_of(url.as_str())?;
            if domain == current_domain {
                return None;
            }
            Some(ExternalLinkEntry {
                url: url.to_string(),
                anchor_text: normalized_text(anchor),
                domain,
                frequency: None,
                total_mentions: None,
            })
        })
        .collect()
}

fn videos_count(document: &Html) -> usize {
    let embedded = selector("iframe[src]")
        .map(|s| {
            document
                .select(&s)
                .filter(|iframe| {
                    let src = iframe.value().attr("src").unwrap_or_default().to_lowercase();
                    src.contains("youtube") || src.contains("vimeo")
                })
                .count()
        })
        .unwrap_or(0);
    count(document, "video") + embedded
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .next()
        .map(normalized_text)
        .filter(|t| !t.is_empty())
}

fn meta_description(document: &Html) -> Option<String> {
    let selector = selector("meta[name=description]")?;
    document
        .select(&selector)
        .filter_map(|m| m.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

/// Parses `source.markup`. Links pointing at `current_domain` are internal
/// and left out.
pub fn parse(source: &ContentSource, current_domain: &str) -> ParsedContent {
    let document = Html::parse_document(&source.markup);

    let plain_text = if source.body_text.trim().is_empty() {
        document
            .root_element()
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        source.body_text.clone()
    };

    ParsedContent {
        headings: headings(&document),
        external_links: external_links(&document, &source.url, current_domain),
        paragraphs_count: count(&document, "p"),
        images_count: count(&document, "img"),
        videos_count: videos_count(&document),
        meta_title: first_text(&document, "title").unwrap_or_else(|| source.title.clone()),
        meta_description: meta_description(&document)
            .or_else(|| source.meta_description.clone())
            .unwrap_or_default(),
        plain_text,
    }
}
