use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Compiles a locator from the rule set. Invalid CSS is logged and treated as
/// "matches nothing" so one bad rule degrades a single field, not the page.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css)
        .inspect_err(|e| warn!(selector = css, error = ?e, "invalid selector in extraction rules"))
        .ok()
}

/// Text of an element with each text node trimmed, blanks dropped, joined by a space.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First info item whose heading satisfies `is_match`, with that heading.
pub(crate) fn find_labelled_item<'a>(
    document: &'a Html,
    items: &Selector,
    heading: &Selector,
    is_match: impl Fn(&str) -> bool,
) -> Option<(ElementRef<'a>, ElementRef<'a>)> {
    document.select(items).find_map(|item| {
        let h = item.select(heading).next()?;
        is_match(&element_text(h)).then_some((item, h))
    })
}
