// src/models/link.rs

//! Hyperlinks found on portal pages.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Selector};
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::error::Result;
use crate::models::Size;

static UPLOAD_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})\s+(\d{2}):(\d{2}):(\d{2})")
        .expect("valid upload time pattern")
});

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid cell selector"));

/// A single `<a href>` resolved against the page it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// URL the href was resolved against
    pub base_url: Url,

    /// The href exactly as written in the markup
    pub href: String,

    /// Absolute URL of the link target
    pub url: Url,

    /// Path component of the raw href (e.g. `deploy.pl`)
    pub path: String,

    /// Link text, NFKC-normalized with whitespace collapsed
    pub description: String,

    /// Query parameters of the href; the first value wins per key
    pub params: HashMap<String, String>,
}

impl Link {
    /// Build a link from its raw href and visible text.
    pub fn new(base_url: &Url, href: &str, text: &str) -> Result<Self> {
        let url = base_url.join(href)?;

        Ok(Self {
            base_url: base_url.clone(),
            href: href.to_string(),
            url,
            path: href_path(href),
            description: normalize_text(text),
            params: query_params(href),
        })
    }

    /// Build a link from an anchor element. Anchors without `href` yield `None`.
    pub fn from_anchor(base_url: &Url, anchor: ElementRef<'_>) -> Option<Self> {
        let href = anchor.value().attr("href")?;
        let text: String = anchor.text().collect();

        match Self::new(base_url, href, &text) {
            Ok(link) => Some(link),
            Err(e) => {
                log::debug!("Skipping unresolvable href {href:?}: {e}");
                None
            }
        }
    }

    /// Value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Upload time and size shown next to a file link in its table row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FileDetails {
    pub upload_time: Option<NaiveDateTime>,
    pub size: Option<Size>,
}

impl FileDetails {
    /// Collect details from the cells of the row enclosing `anchor`.
    ///
    /// A cell starting with `YYYY-MM-DD HH:MM:SS` provides the upload time,
    /// otherwise a cell parsing as a [`Size`] provides the size. The first
    /// match of each kind wins; other cells are ignored.
    pub fn from_anchor(anchor: ElementRef<'_>) -> Self {
        let mut details = Self::default();

        let Some(row) = anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "tr")
        else {
            return details;
        };

        for cell in row.select(&CELL_SELECTOR) {
            let text: String = cell.text().collect();
            let text = text.trim();

            if let Some(upload_time) = parse_upload_time(text) {
                details.upload_time.get_or_insert(upload_time);
            } else if let Some(size) = Size::parse(text) {
                details.size.get_or_insert(size);
            }
        }

        details
    }
}

/// Parse a `YYYY-MM-DD HH:MM:SS` prefix; impossible dates yield `None`.
pub fn parse_upload_time(text: &str) -> Option<NaiveDateTime> {
    let caps = UPLOAD_TIME_PATTERN.captures(text)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    NaiveDate::from_ymd_opt(field(1)? as i32, field(2)?, field(3)?)?
        .and_hms_opt(field(4)?, field(5)?, field(6)?)
}

fn normalize_text(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Path component of a possibly relative href.
fn href_path(href: &str) -> String {
    if let Ok(absolute) = Url::parse(href) {
        return absolute.path().to_string();
    }

    let end = href.find(['?', '#']).unwrap_or(href.len());
    href[..end].to_string()
}

/// Query parameters of a possibly relative href, skipping blank values.
fn query_params(href: &str) -> HashMap<String, String> {
    let without_fragment = href.split('#').next().unwrap_or_default();
    let Some((_, query)) = without_fragment.split_once('?') else {
        return HashMap::new();
    };

    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SizeUnit;
    use scraper::Html;

    fn base() -> Url {
        Url::parse("https://portal.example.com/command/mod_perl/").unwrap()
    }

    #[test]
    fn test_new_resolves_relative_href() {
        let link = Link::new(&base(), "deploy.pl?Do=DISTR&Id=42", "Dist").unwrap();
        assert_eq!(
            link.url.as_str(),
            "https://portal.example.com/command/mod_perl/deploy.pl?Do=DISTR&Id=42"
        );
        assert_eq!(link.path, "deploy.pl");
        assert_eq!(link.param("Do"), Some("DISTR"));
        assert_eq!(link.param("Id"), Some("42"));
    }

    #[test]
    fn test_new_resolves_parent_reference() {
        let link = Link::new(&base(), "../static/logo.png", "").unwrap();
        assert_eq!(
            link.url.as_str(),
            "https://portal.example.com/command/static/logo.png"
        );
        assert_eq!(link.path, "../static/logo.png");
        assert!(link.params.is_empty());
    }

    #[test]
    fn test_absolute_href_uses_its_own_path() {
        let link = Link::new(&base(), "https://other.example.com/a/b.pl?x=1#top", "").unwrap();
        assert_eq!(link.path, "/a/b.pl");
        assert_eq!(link.param("x"), Some("1"));
    }

    #[test]
    fn test_first_param_value_wins_and_blank_values_are_dropped() {
        let link = Link::new(&base(), "deploy.pl?Id=1&Id=2&Do=&Name=a%20b#frag", "").unwrap();
        assert_eq!(link.param("Id"), Some("1"));
        assert_eq!(link.param("Do"), None);
        assert_eq!(link.param("Name"), Some("a b"));
    }

    #[test]
    fn test_description_is_normalized() {
        let link = Link::new(&base(), "x", "  Ｒelease\u{00A0}\n  Notes\t ").unwrap();
        assert_eq!(link.description, "Release Notes");
    }

    #[test]
    fn test_from_anchor() {
        let html = Html::parse_fragment(r#"<a href="deploy.pl?ProjectId=7"> My <b>Project</b> </a>"#);
        let selector = Selector::parse("a").unwrap();
        let anchor = html.select(&selector).next().unwrap();

        let link = Link::from_anchor(&base(), anchor).unwrap();
        assert_eq!(link.description, "My Project");
        assert_eq!(link.param("ProjectId"), Some("7"));
    }

    #[test]
    fn test_from_anchor_without_href() {
        let html = Html::parse_fragment(r#"<a name="top">Top</a>"#);
        let selector = Selector::parse("a").unwrap();
        let anchor = html.select(&selector).next().unwrap();

        assert!(Link::from_anchor(&base(), anchor).is_none());
    }

    #[test]
    fn test_file_details_from_row() {
        let html = Html::parse_document(
            r#"<table><tr>
                <td><a href="attachment.pl?Do=GET&Id=5">readme.txt</a></td>
                <td>2023-01-05 10:00:00</td>
                <td>4.2 MB</td>
                <td>1 KB</td>
                <td>n/a</td>
            </tr></table>"#,
        );
        let selector = Selector::parse("a").unwrap();
        let anchor = html.select(&selector).next().unwrap();

        let details = FileDetails::from_anchor(anchor);
        assert_eq!(
            details.upload_time,
            NaiveDate::from_ymd_opt(2023, 1, 5).and_then(|d| d.and_hms_opt(10, 0, 0))
        );
        assert_eq!(details.size, Some(Size::new(4.2, SizeUnit::MegaByte)));
    }

    #[test]
    fn test_file_details_keeps_first_upload_time() {
        let html = Html::parse_document(
            r#"<table><tr>
                <td><a href="attachment.pl?Do=GET&Id=5">readme.txt</a></td>
                <td>2023-01-05 10:00:00</td>
                <td>2024-06-30 23:15:00</td>
                <td>643 B</td>
            </tr></table>"#,
        );
        let selector = Selector::parse("a").unwrap();
        let anchor = html.select(&selector).next().unwrap();

        let details = FileDetails::from_anchor(anchor);
        assert_eq!(
            details.upload_time,
            NaiveDate::from_ymd_opt(2023, 1, 5).and_then(|d| d.and_hms_opt(10, 0, 0))
        );
        assert_eq!(details.size, Some(Size::new(643.0, SizeUnit::Byte)));
    }

    #[test]
    fn test_file_details_outside_table() {
        let html = Html::parse_fragment(r#"<div><a href="attachment.pl?Do=GET&Id=5">x</a> 4 MB</div>"#);
        let selector = Selector::parse("a").unwrap();
        let anchor = html.select(&selector).next().unwrap();

        assert_eq!(FileDetails::from_anchor(anchor), FileDetails::default());
    }

    #[test]
    fn test_parse_upload_time_rejects_impossible_dates() {
        assert!(parse_upload_time("2023-13-05 10:00:00").is_none());
        assert!(parse_upload_time("yesterday").is_none());
        assert!(parse_upload_time("2023-02-28 23:59:59 UTC").is_some());
    }
}
