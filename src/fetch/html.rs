// src/fetch/html.rs
// =============================================================================
// This module pulls the bits the crawler needs out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so broken markup still parses
//
// Only raw href values are returned here. Resolving them against the page
// URL and filtering by domain is the crawl engine's job (crawl::links).
// =============================================================================

use scraper::{Html, Selector};

// Everything the crawler reads from one page, parsed in a single pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Raw href attribute values of <a> tags, in DOM order
    pub hrefs: Vec<String>,
    /// Trimmed <title> text, if the page has a non-blank one
    pub title: Option<String>,
}

/// Parses `html` once and returns its anchor hrefs and title.
///
/// ```text
/// <title>Docs</title><a href="/a">A</a><a href="https://x.io">X</a>
///   -> hrefs: ["/a", "https://x.io"], title: Some("Docs")
/// ```
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        hrefs: hrefs_in(&document),
        title: title_in(&document),
    }
}

// Raw href of every <a href>, in DOM order
fn hrefs_in(document: &Html) -> Vec<String> {
    // "a[href]" is a constant selector and always parses
    let selector = Selector::parse("a[href]").expect("valid a[href] selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn title_in(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").expect("valid title selector");

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
