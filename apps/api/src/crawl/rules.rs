//! Extraction Rule Set: the declarative, site-specific half of extraction.
//!
//! Every field the extractor fills is described here as an ordered list of CSS
//! locators plus the marker tokens and vocabularies used by the fallback
//! strategies. The extractor and link discovery never name a selector
//! themselves, so pointing the crawler at a different board means building a
//! different `ExtractionRules`, not touching the pipeline.

use serde::{Deserialize, Serialize};

/// Title: first locator whose first match has non-empty text wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleRule {
    pub locators: Vec<String>,
}

/// Labelled info blocks ("heading + body" items) shared by several fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoBlockRule {
    /// Locator for every info item on the page.
    pub item: String,
    /// Locator for the heading inside an item.
    pub heading: String,
    /// Locator for the tag-list container inside an item.
    pub tag_container: String,
    /// Locator for a single tag inside the container.
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Info items considered for the explicit breadcrumb tag list.
    pub scope: String,
    /// Heading token marking the category block.
    pub marker: String,
    /// Tag locator inside the category block's tag container.
    pub tag: String,
    /// Fallback breadcrumb anchors, used when the explicit block yields nothing.
    pub breadcrumb_links: String,
    /// Maximum number of fallback anchors kept.
    pub breadcrumb_cap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationRule {
    /// Any of these tokens in a heading marks the education block.
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaRule {
    /// Metadata list items scanned for location and work type.
    pub items: String,
    /// Known city names; matched as whole words.
    pub cities: Vec<String>,
    /// Employment-type phrases; matched as substrings.
    pub work_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsRule {
    /// Heading token marking the skills block.
    pub marker: String,
    /// Characters the plain-text fallback splits on.
    pub delimiters: Vec<char>,
    /// Fragments longer than this (in characters) are discarded.
    pub max_fragment_chars: usize,
    /// Last-resort vocabulary scanned in the page's lowercased text.
    pub keyword_vocabulary: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRule {
    /// Posting anchors on a listing page; the first locator that yields any
    /// link wins, later ones are fallbacks.
    pub posting_links: Vec<String>,
    /// Explicit "next page" anchor.
    pub next_page: String,
    /// Query parameter carrying the page number.
    pub page_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRules {
    pub title: TitleRule,
    pub info_blocks: InfoBlockRule,
    pub category: CategoryRule,
    pub education: EducationRule,
    pub meta: MetaRule,
    pub skills: SkillsRule,
    pub listing: ListingRule,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ExtractionRules {
    /// Rules for jobinja.ir listing and posting markup.
    pub fn jobinja() -> Self {
        Self {
            title: TitleRule {
                locators: strings(&[
                    "h1.c-jobView__title",
                    "h1",
                    "h2.c-jobView__title",
                    "h2.o-jobView__title",
                    "h2.o-listView__itemTitle",
                    "h1[itemprop='title']",
                ]),
            },
            info_blocks: InfoBlockRule {
                item: "li.c-infoBox__item".to_string(),
                heading: "h4.c-infoBox__itemTitle".to_string(),
                tag_container: "div.tags".to_string(),
                tag: "span".to_string(),
            },
            category: CategoryRule {
                scope: "ul.c-jobView__firstInfoBox.c-infoBox > li.c-infoBox__item".to_string(),
                marker: "دسته\u{200c}بندی شغلی".to_string(),
                tag: "span.black".to_string(),
                breadcrumb_links: ".c-jobView__breadcrumb a, .c-jobView__category, .c-jobView__meta a"
                    .to_string(),
                breadcrumb_cap: 3,
            },
            education: EducationRule {
                markers: strings(&["تحصیل", "مدرک", "تحصیلات"]),
            },
            meta: MetaRule {
                items: "ul.o-listView__itemComplementInfo li, ul.c-jobListView__meta li, div.c-jobView__meta li"
                    .to_string(),
                cities: strings(&[
                    "تهران", "اصفهان", "شیراز", "مشهد", "کرج", "ساری", "رشت", "تبریز",
                ]),
                work_types: vec![
                    "تمام\u{200c}وقت".to_string(),
                    "پاره\u{200c}وقت".to_string(),
                    "پاره وقت".to_string(),
                    "فریلنس".to_string(),
                    "ساعتی".to_string(),
                    "پاره".to_string(),
                ],
            },
            skills: SkillsRule {
                marker: "مهارت".to_string(),
                delimiters: vec![',', '،', ';', '-', '•'],
                max_fragment_chars: 80,
                keyword_vocabulary: strings(&[
                    "python",
                    "django",
                    "docker",
                    "react",
                    "vue",
                    "javascript",
                    "sql",
                    "mysql",
                    "postgres",
                    "linux",
                    "rest",
                    "api",
                    "office",
                    "microsoft office",
                ]),
            },
            listing: ListingRule {
                posting_links: strings(&["a.c-jobListView__titleLink", "li.o-listView__item a"]),
                next_page: "a.c-pagination__next, a[rel='next']".to_string(),
                page_param: "page".to_string(),
            },
        }
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::jobinja()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_default_rules_have_valid_selectors() {
        let rules = ExtractionRules::default();
        let mut all: Vec<&str> = rules.title.locators.iter().map(String::as_str).collect();
        all.extend(rules.listing.posting_links.iter().map(String::as_str));
        all.extend([
            rules.info_blocks.item.as_str(),
            rules.info_blocks.heading.as_str(),
            rules.info_blocks.tag_container.as_str(),
            rules.info_blocks.tag.as_str(),
            rules.category.scope.as_str(),
            rules.category.tag.as_str(),
            rules.category.breadcrumb_links.as_str(),
            rules.meta.items.as_str(),
            rules.listing.next_page.as_str(),
        ]);
        for css in all {
            assert!(Selector::parse(css).is_ok(), "invalid selector: {css}");
        }
    }

    #[test]
    fn test_markers_keep_zero_width_non_joiner() {
        let rules = ExtractionRules::jobinja();
        assert!(rules.category.marker.contains('\u{200c}'));
        assert!(rules.meta.work_types[0].contains('\u{200c}'));
    }
}
