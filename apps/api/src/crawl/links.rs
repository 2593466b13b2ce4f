//! Link Discovery: posting links and the next listing page, from an
//! already-parsed listing document. Pure transforms, no I/O.

use std::collections::HashSet;

use scraper::Html;
use url::Url;

use crate::crawl::dom::selector;
use crate::crawl::rules::ListingRule;

/// Absolute posting URLs in first-seen order, each at most once.
///
/// Locators are tried in order; the first one that yields any link wins.
pub fn discover_links(document: &Html, base: &Url, rule: &ListingRule) -> Vec<String> {
    for css in &rule.posting_links {
        let Some(sel) = selector(css) else {
            continue;
        };
        let links: Vec<String> = document
            .select(&sel)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| base.join(href).ok())
            .map(String::from)
            .collect();
        if !links.is_empty() {
            return dedupe_preserving_order(links);
        }
    }
    Vec::new()
}

fn dedupe_preserving_order(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links.into_iter().filter(|l| seen.insert(l.clone())).collect()
}

/// The listing page after `current`.
///
/// A numeric page parameter on the current URL is incremented; otherwise an
/// explicit next-page anchor on the document is followed. `None` means the
/// listing is exhausted.
pub fn next_page_url(current: &Url, document: &Html, rule: &ListingRule) -> Option<Url> {
    if let Some(next) = increment_page_param(current, &rule.page_param) {
        return Some(next);
    }

    let sel = selector(&rule.next_page)?;
    let href = document
        .select(&sel)
        .find_map(|a| a.value().attr("href").filter(|h| !h.trim().is_empty()))?;
    current.join(href).ok().filter(|next| next != current)
}

fn increment_page_param(current: &Url, param: &str) -> Option<Url> {
    let pairs: Vec<(String, String)> = current.query_pairs().into_owned().collect();
    let page: u64 = pairs
        .iter()
        .find(|(k, _)| k == param)
        .and_then(|(_, v)| v.parse().ok())?;

    let mut next = current.clone();
    next.query_pairs_mut().clear().extend_pairs(pairs.iter().map(|(k, v)| {
        if k == param {
            (k.clone(), (page + 1).to_string())
        } else {
            (k.clone(), v.clone())
        }
    }));
    Some(next)
}
