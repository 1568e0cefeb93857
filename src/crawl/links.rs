// src/crawl/links.rs
// =============================================================================
// URL normalization, validation and same-domain filtering.
//
// Every URL the crawler touches goes through the same pipeline:
//   1. Resolve against the page it was found on (discovered links only)
//   2. Normalize: trim, reject empty, add https:// when no scheme is given
//   3. Validate: must parse, scheme is http/https, host is non-empty
//   4. Same-domain: hostname must equal the seed's hostname exactly
//
// The seed URL fails loudly when it is invalid. Discovered links never do:
// a bad href becomes a LinkParseError and is simply filtered out.
// =============================================================================

use crate::error::{CrawlError, LinkParseError};
use url::Url;

/// Trims the input and makes sure it carries an http(s) scheme.
///
/// Returns `None` for empty or whitespace-only input.
///
/// ```text
/// "  example.com/docs " -> Some("https://example.com/docs")
/// "HTTP://example.com"  -> Some("HTTP://example.com")
/// "   "                 -> None
/// ```
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if has_http_scheme(trimmed) {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{}", trimmed))
    }
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Checks that a parsed URL is something we can crawl.
fn validate(url: Url) -> Result<Url, LinkParseError> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(LinkParseError::UnsupportedScheme(other.to_string())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(LinkParseError::MissingHost(url.to_string())),
    }
}

/// Normalizes and validates the seed URL of a crawl.
///
/// This is the only place where an invalid URL is an error for the caller.
pub fn parse_seed_url(raw: &str) -> Result<Url, CrawlError> {
    let invalid = |reason: String| CrawlError::InvalidSeedUrl {
        url: raw.to_string(),
        reason,
    };

    let normalized = normalize_url(raw).ok_or_else(|| invalid("empty URL".to_string()))?;
    let mut parsed = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
    parsed.set_fragment(None);

    validate(parsed).map_err(|e| invalid(e.to_string()))
}

/// Resolves one href found on `base` into an absolute, crawlable URL.
///
/// Relative resolution happens first, so `/docs` on `https://example.com/x`
/// becomes `https://example.com/docs`. Fragments are dropped so that
/// `page#a` and `page#b` are the same traversal target.
pub fn resolve_link(base: &Url, href: &str) -> Result<Url, LinkParseError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(LinkParseError::Empty);
    }

    let mut resolved = base
        .join(href)
        .map_err(|e| LinkParseError::Unresolvable {
            href: href.to_string(),
            reason: e.to_string(),
        })?;
    resolved.set_fragment(None);

    validate(resolved)
}

/// Hostname equality, ignoring ASCII case. Subdomains do not match.
pub fn same_host(url: &Url, host: &str) -> bool {
    url.host_str()
        .map(|h| h.eq_ignore_ascii_case(host))
        .unwrap_or(false)
}

/// Turns the raw hrefs of a page into same-domain traversal candidates.
///
/// Order follows the input (DOM order). Hrefs that fail to resolve or point
/// at another host are dropped.
pub fn filter_links<'a, I>(base: &Url, seed_host: &str, hrefs: I) -> Vec<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    hrefs
        .into_iter()
        .filter_map(|href| match resolve_link(base, href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Dropping link {:?} on {}: {}", href, base, e);
                None
            }
        })
        .filter(|url| same_host(url, seed_host))
        .collect()
}
