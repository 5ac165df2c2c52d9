//! Announcement list parsing.
//!
//! An announcement renders as a timestamp followed by the title, usually on
//! two lines:
//!
//! ```text
//! 01.03.2024 10:00
//! Заявление МИД России
//! ```
//!
//! When the markup keeps both inline, the title directly follows the sixteen
//! timestamp characters on the same line.
//!
//! A single-line element that does not start with a timestamp is not an
//! announcement and is skipped. A two-line element whose timestamp does not
//! parse, or an announcement without a link, aborts the run: the page layout
//! has changed and nothing on it can be trusted.

use crate::error::ExtractError;
use crate::models::{Candidate, LIST_TIMESTAMP_FORMAT};
use crate::renderer::Element;
use chrono::NaiveDateTime;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

const TIMESTAMP_CHARS: usize = 16;

/// Parse announcement elements in page order.
#[instrument(level = "info", skip_all, fields(elements = elements.len()))]
pub fn extract_candidates(elements: &[Element]) -> Result<Vec<Candidate>, ExtractError> {
    let mut candidates = Vec::with_capacity(elements.len());
    for element in elements {
        let link = || {
            element
                .first_by_tag("a")
                .and_then(|a| a.attribute("href"))
        };
        if let Some(candidate) = parse_announcement(&element.text(), link)? {
            candidates.push(candidate);
        }
    }
    debug!(count = candidates.len(), "Extracted candidates");
    Ok(candidates)
}

/// Parse one announcement's rendered text. `link` is only consulted for
/// elements that look like announcements.
pub fn parse_announcement(
    text: &str,
    link: impl FnOnce() -> Option<String>,
) -> Result<Option<Candidate>, ExtractError> {
    let text = text.trim();
    let (stamp, rest, single_line) = match text.split_once('\n') {
        Some((stamp, rest)) => (stamp, rest, false),
        None => (text, "", true),
    };

    let raw: String = stamp.chars().take(TIMESTAMP_CHARS).collect();
    let published_at = match NaiveDateTime::parse_from_str(raw.trim(), LIST_TIMESTAMP_FORMAT) {
        Ok(published_at) => published_at,
        Err(_) if single_line => {
            debug!(text = %text, "Skipping element without timestamp");
            return Ok(None);
        }
        Err(source) => return Err(ExtractError::BadTimestamp { raw, source }),
    };

    let title = if single_line {
        stamp.chars().skip(TIMESTAMP_CHARS).collect::<String>()
    } else {
        rest.to_string()
    };
    let title = title.split_whitespace().join(" ");
    if title.is_empty() {
        warn!(%published_at, "Skipping announcement with empty title");
        return Ok(None);
    }

    let url = link().ok_or_else(|| ExtractError::MissingLink {
        title: title.clone(),
    })?;

    Ok(Some(Candidate {
        published_at,
        title,
        url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use url::Url;

    fn link(url: &str) -> impl FnOnce() -> Option<String> + '_ {
        move || Some(url.to_string())
    }

    #[test]
    fn test_parse_single_announcement() {
        let candidate = parse_announcement("01.03.2024 10:00\nTitle A", link("https://x/a"))
            .unwrap()
            .unwrap();

        assert_eq!(
            candidate.published_at,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );
        assert_eq!(candidate.title, "Title A");
        assert_eq!(candidate.url, "https://x/a");
    }

    #[test]
    fn test_no_line_break_is_skipped_without_link_lookup() {
        let result = parse_announcement("Все новости", || panic!("link looked up")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_only_first_sixteen_chars_are_the_timestamp() {
        let candidate = parse_announcement(
            "01.03.2024 10:00 | Брифинг\n  Title with spaces  \n",
            link("https://x/a"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(candidate.title, "Title with spaces");
        assert_eq!(candidate.published_at.format("%H:%M").to_string(), "10:00");
    }

    #[test]
    fn test_title_whitespace_is_collapsed() {
        let candidate = parse_announcement(
            "01.03.2024 10:00\nЗаявление\nМИД \t России",
            link("https://x/a"),
        )
        .unwrap()
        .unwrap();
        assert_eq!(candidate.title, "Заявление МИД России");
    }

    #[test]
    fn test_single_line_announcement() {
        let candidate = parse_announcement("01.03.2024 10:00 Title A", link("https://x/a"))
            .unwrap()
            .unwrap();
        assert_eq!(candidate.title, "Title A");
        assert_eq!(candidate.published_at.format("%d.%m %H:%M").to_string(), "01.03 10:00");
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let err = parse_announcement("yesterday\nTitle", link("https://x/a")).unwrap_err();
        assert!(matches!(err, ExtractError::BadTimestamp { ref raw, .. } if raw == "yesterday"));
    }

    #[test]
    fn test_missing_link_is_fatal() {
        let err = parse_announcement("01.03.2024 10:00\nTitle A", || None).unwrap_err();
        assert!(matches!(err, ExtractError::MissingLink { ref title } if title == "Title A"));
    }

    #[test]
    fn test_extract_from_elements_in_page_order() {
        let base = Url::parse("https://mid.ru/ru/foreign_policy/news/").unwrap();
        let elements = vec![
            Element::new(
                r#"<div class="announce__item"><span>02.03.2024 09:15</span><a href="/ru/2/">Second</a></div>"#,
                Some(base.clone()),
            ),
            Element::new(r#"<div class="announce__item">Архив</div>"#, Some(base.clone())),
            Element::new(
                r#"<div class="announce__item"><span>01.03.2024 18:00</span><a href="/ru/1/">First</a></div>"#,
                Some(base),
            ),
        ];

        let candidates = extract_candidates(&elements).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Second");
        assert_eq!(candidates[0].url, "https://mid.ru/ru/2/");
        assert_eq!(candidates[1].title, "First");
    }

    #[test]
    fn test_extract_with_inline_markup_in_title_and_timestamp() {
        let base = Url::parse("https://mid.ru/ru/foreign_policy/news/").unwrap();
        let elements = vec![
            Element::new(
                r#"<div class="announce__item"><span>01.03.2024 10:00</span><a href="/ru/1/">Заявление <b>МИД</b> России</a></div>"#,
                Some(base.clone()),
            ),
            Element::new(
                r#"<div class="announce__item"><div><span>02.03.2024</span> <span>11:30</span></div><a href="/ru/2/">Брифинг</a></div>"#,
                Some(base),
            ),
        ];

        let candidates = extract_candidates(&elements).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Заявление МИД России");
        assert_eq!(candidates[0].url, "https://mid.ru/ru/1/");
        assert_eq!(
            candidates[1].published_at.format("%d.%m.%Y %H:%M").to_string(),
            "02.03.2024 11:30"
        );
        assert_eq!(candidates[1].title, "Брифинг");
    }

    #[test]
    fn test_extract_fails_on_announcement_without_anchor() {
        let elements = vec![Element::new(
            r#"<div class="announce__item"><span>01.03.2024 18:00</span><span>No link</span></div>"#,
            None,
        )];
        assert!(matches!(
            extract_candidates(&elements),
            Err(ExtractError::MissingLink { .. })
        ));
    }
}
