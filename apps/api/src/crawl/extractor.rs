//! Record Extractor: turns one fetched posting page into a `JobRecord`.
//!
//! Five independent concerns (title, category, education, location/work type,
//! skills) each run their own rule from `ExtractionRules`. A concern that finds
//! nothing leaves its field empty; the record shape is always complete.

use std::collections::HashSet;

use regex::Regex;
use scraper::Html;
use tracing::warn;

use crate::crawl::dom::{element_text, find_labelled_item, selector};
use crate::crawl::rules::{
    CategoryRule, EducationRule, ExtractionRules, InfoBlockRule, MetaRule, SkillsRule, TitleRule,
};
use crate::models::job::JobRecord;

/// Separator used when joining breadcrumb segments.
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// Parses `html` and extracts a record for `url`.
///
/// The parsed document never outlives this call, so callers in async code can
/// hold the returned record across await points.
pub fn extract_record(html: &str, url: &str, rules: &ExtractionRules) -> JobRecord {
    let document = Html::parse_document(html);
    extract_from_document(&document, url, rules)
}

fn extract_from_document(document: &Html, url: &str, rules: &ExtractionRules) -> JobRecord {
    let (location, work_type) = extract_location_and_work_type(document, &rules.meta);

    JobRecord {
        title: extract_title(document, &rules.title).unwrap_or_default(),
        category: extract_category(document, &rules.info_blocks, &rules.category)
            .unwrap_or_default(),
        min_education: extract_education(document, &rules.info_blocks, &rules.education)
            .unwrap_or_default(),
        location,
        work_type,
        skills: extract_skills(document, &rules.info_blocks, &rules.skills),
        ..JobRecord::empty(url)
    }
}

/// Skills only, for the live single-posting path.
pub fn extract_skills_from_html(html: &str, rules: &ExtractionRules) -> Vec<String> {
    let document = Html::parse_document(html);
    extract_skills(&document, &rules.info_blocks, &rules.skills)
}

fn extract_title(document: &Html, rule: &TitleRule) -> Option<String> {
    rule.locators
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            document
                .select(&sel)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
        })
}

fn extract_category(document: &Html, blocks: &InfoBlockRule, rule: &CategoryRule) -> Option<String> {
    explicit_breadcrumb(document, blocks, rule)
        .filter(|c| !c.is_empty())
        .or_else(|| link_breadcrumb(document, rule))
}

fn explicit_breadcrumb(document: &Html, blocks: &InfoBlockRule, rule: &CategoryRule) -> Option<String> {
    let scope = selector(&rule.scope)?;
    let heading = selector(&blocks.heading)?;
    let (item, _) = find_labelled_item(document, &scope, &heading, |h| h.contains(&rule.marker))?;
    let container = item.select(&selector(&blocks.tag_container)?).next()?;
    let tag = selector(&rule.tag)?;

    let segments: Vec<String> = container
        .select(&tag)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    Some(segments.join(BREADCRUMB_SEPARATOR))
}

fn link_breadcrumb(document: &Html, rule: &CategoryRule) -> Option<String> {
    let links = selector(&rule.breadcrumb_links)?;
    let segments: Vec<String> = document
        .select(&links)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .take(rule.breadcrumb_cap)
        .collect();
    (!segments.is_empty()).then(|| segments.join(BREADCRUMB_SEPARATOR))
}

fn extract_education(document: &Html, blocks: &InfoBlockRule, rule: &EducationRule) -> Option<String> {
    let items = selector(&blocks.item)?;
    let heading = selector(&blocks.heading)?;
    let (item, h) = find_labelled_item(document, &items, &heading, |text| {
        rule.markers.iter().any(|m| text.contains(m.as_str()))
    })?;
    Some(strip_heading(&element_text(item), &element_text(h)))
}

fn strip_heading(text: &str, heading: &str) -> String {
    if heading.is_empty() {
        return text.trim().to_string();
    }
    text.replace(heading, "").trim().to_string()
}

fn extract_location_and_work_type(document: &Html, rule: &MetaRule) -> (String, String) {
    let mut location = String::new();
    let mut work_type = String::new();

    let Some(items) = selector(&rule.items) else {
        return (location, work_type);
    };
    let cities = city_pattern(&rule.cities);

    // Later items overwrite earlier ones; an item may set both fields.
    for item in document.select(&items) {
        let text = element_text(item);
        if cities.as_ref().is_some_and(|re| re.is_match(&text)) {
            location = text.clone();
        }
        if rule.work_types.iter().any(|w| text.contains(w.as_str())) {
            work_type = text;
        }
    }

    (location, work_type)
}

fn city_pattern(cities: &[String]) -> Option<Regex> {
    if cities.is_empty() {
        return None;
    }
    let alternation = cities
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b"))
        .inspect_err(|e| warn!(error = %e, "invalid city pattern"))
        .ok()
}

/// Skills block tags, then the block's delimited text, then the keyword scan.
fn extract_skills(document: &Html, blocks: &InfoBlockRule, rule: &SkillsRule) -> Vec<String> {
    let mut skills = skills_from_block(document, blocks, rule);
    if skills.is_empty() {
        skills = scan_keywords(document, &rule.keyword_vocabulary);
    }
    normalize_skills(skills)
}

fn skills_from_block(document: &Html, blocks: &InfoBlockRule, rule: &SkillsRule) -> Vec<String> {
    let (Some(items), Some(heading)) = (selector(&blocks.item), selector(&blocks.heading)) else {
        return Vec::new();
    };
    let Some((item, h)) = find_labelled_item(document, &items, &heading, |text| {
        text.contains(&rule.marker)
    }) else {
        return Vec::new();
    };

    let container = selector(&blocks.tag_container).and_then(|sel| item.select(&sel).next());
    match (container, selector(&blocks.tag)) {
        (Some(container), Some(tag)) => container
            .select(&tag)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect(),
        _ => split_fragments(&strip_heading(&element_text(item), &element_text(h)), rule),
    }
}

fn split_fragments(text: &str, rule: &SkillsRule) -> Vec<String> {
    text.split(|c: char| rule.delimiters.contains(&c))
        .map(str::trim)
        .filter(|p| !p.is_empty() && p.chars().count() <= rule.max_fragment_chars)
        .map(str::to_string)
        .collect()
}

/// Vocabulary order, not page order.
fn scan_keywords(document: &Html, vocabulary: &[String]) -> Vec<String> {
    let body = element_text(document.root_element()).to_lowercase();
    vocabulary
        .iter()
        .filter(|kw| body.contains(kw.to_lowercase().as_str()))
        .cloned()
        .collect()
}

/// Collapses inner whitespace, drops blanks and repeats, keeps first-seen order.
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTING: &str = r#"
        <html><body>
          <h1 class="c-jobView__title">  Senior   Backend Developer </h1>
          <div class="c-jobView__meta"><ul>
            <li>تهران ، ونک</li>
            <li>قرارداد تمام‌وقت</li>
          </ul></div>
          <ul class="c-jobView__firstInfoBox c-infoBox">
            <li class="c-infoBox__item">
              <h4 class="c-infoBox__itemTitle">دسته‌بندی شغلی</h4>
              <div class="tags"><span class="black">وب، برنامه‌نویسی و نرم‌افزار</span><span class="black">Backend</span></div>
            </li>
          </ul>
          <ul class="c-infoBox">
            <li class="c-infoBox__item">
              <h4 class="c-infoBox__itemTitle">حداقل مدرک تحصیلی</h4>
              <div class="tags"><span class="black">کارشناسی</span></div>
            </li>
            <li class="c-infoBox__item">
              <h4 class="c-infoBox__itemTitle">مهارت‌های مورد نیاز</h4>
              <div class="tags"><span class="black">Python</span><span class="black">Django</span><span class="black">Python</span><span class="black">  SQL   Server </span></div>
            </li>
          </ul>
        </body></html>
    "#;

    fn rules() -> ExtractionRules {
        ExtractionRules::jobinja()
    }

    #[test]
    fn test_full_posting_extracts_every_field() {
        let record = extract_record(POSTING, "https://jobinja.ir/jobs/1", &rules());
        assert_eq!(record.title, "Senior   Backend Developer");
        assert_eq!(record.category, "وب، برنامه‌نویسی و نرم‌افزار > Backend");
        assert_eq!(record.min_education, "کارشناسی");
        assert_eq!(record.location, "تهران ، ونک");
        assert_eq!(record.work_type, "قرارداد تمام‌وقت");
        assert_eq!(record.skills, vec!["Python", "Django", "SQL Server"]);
        assert_eq!(record.url, "https://jobinja.ir/jobs/1");
    }

    #[test]
    fn test_empty_page_degrades_to_empty_fields() {
        let record = extract_record("<html><body></body></html>", "https://x/1", &rules());
        assert_eq!(record.title, "");
        assert_eq!(record.category, "");
        assert_eq!(record.min_education, "");
        assert_eq!(record.location, "");
        assert_eq!(record.work_type, "");
        assert!(record.skills.is_empty());
    }

    #[test]
    fn test_title_falls_through_to_later_locator() {
        let html = r#"<h1 class="c-jobView__title">   </h1><h2 class="o-jobView__title">Data Engineer</h2>"#;
        let record = extract_record(html, "u", &rules());
        // bare `h1` matches the same empty element, so the h2 rule wins
        assert_eq!(record.title, "Data Engineer");
    }

    #[test]
    fn test_skills_text_fallback_splits_on_delimiters() {
        let long = "x".repeat(81);
        let html = format!(
            r#"<li class="c-infoBox__item"><h4 class="c-infoBox__itemTitle">مهارت‌ها</h4>
               <p>Go, Rust; Kafka • Redis - K8s ، Linux, {long}</p></li>"#
        );
        let record = extract_record(&html, "u", &rules());
        assert_eq!(record.skills, vec!["Go", "Rust", "Kafka", "Redis", "K8s", "Linux"]);
    }

    #[test]
    fn test_keyword_scan_uses_vocabulary_order() {
        let html = "<body><p>We use Docker and Linux daily, some Python too.</p></body>";
        let record = extract_record(html, "u", &rules());
        assert_eq!(record.skills, vec!["python", "docker", "linux"]);
    }

    #[test]
    fn test_category_falls_back_to_breadcrumb_links_capped_at_three() {
        let html = r#"<div class="c-jobView__breadcrumb">
            <a>Home</a><a>Jobs</a><a>IT</a><a>Backend</a></div>"#;
        let record = extract_record(html, "u", &rules());
        assert_eq!(record.category, "Home > Jobs > IT");
    }

    #[test]
    fn test_city_requires_whole_word() {
        let html = r#"<div class="c-jobView__meta"><ul><li>تهرانپارس</li></ul></div>"#;
        let record = extract_record(html, "u", &rules());
        assert_eq!(record.location, "");
    }

    #[test]
    fn test_normalize_skills_dedupes_after_collapsing_whitespace() {
        let skills = vec![
            "rust".to_string(),
            " ".to_string(),
            "machine  learning".to_string(),
            "machine learning".to_string(),
        ];
        assert_eq!(normalize_skills(skills), vec!["rust", "machine learning"]);
    }
}
