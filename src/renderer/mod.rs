//! Page rendering capability used by the pipeline.
//!
//! A renderer is a stateful session: it loads one page at a time and answers
//! element queries against it. Queries return owned [`Element`] snapshots so
//! callers can keep them after the session moves on to another page.
//!
//! # Implementations
//!
//! | Type | Backend |
//! |------|---------|
//! | [`http::HttpRenderer`] | `reqwest`, optionally through a Browserless `/content` endpoint |
//! | `testing::ScriptedRenderer` | canned HTML per URL (tests only) |

pub mod http;

use crate::error::RenderError;
use itertools::Itertools;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// A stateful page session.
pub trait PageRenderer {
    /// Load `url`, replacing the current page.
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Wait until an element with class `class` is present on the current page
    /// and return the first one. Exceeding `timeout` yields [`RenderError::Timeout`].
    async fn wait_for_visible(
        &mut self,
        class: &str,
        timeout: Duration,
    ) -> Result<Element, RenderError>;

    /// Release the session. Called once at the end of every run.
    async fn close(&mut self);
}

/// Owned snapshot of a DOM element.
#[derive(Debug, Clone)]
pub struct Element {
    outer_html: String,
    base: Option<Url>,
}

impl Element {
    pub fn new(outer_html: impl Into<String>, base: Option<Url>) -> Self {
        Self {
            outer_html: outer_html.into(),
            base,
        }
    }

    /// Rendered text, close to a browser's `innerText`: block elements and
    /// `<br>` start a new line, inline markup does not, and whitespace inside a
    /// line collapses to single spaces. Blank lines are dropped.
    pub fn text(&self) -> String {
        let fragment = Html::parse_fragment(&self.outer_html);
        let mut lines = Vec::new();
        let mut line = String::new();
        collect_text(fragment.root_element(), &mut line, &mut lines);
        flush_line(&mut line, &mut lines);
        lines.join("\n")
    }

    pub fn outer_markup(&self) -> &str {
        &self.outer_html
    }

    /// Attribute of this element. `href` and `src` are resolved against the
    /// page the element came from.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let fragment = Html::parse_fragment(&self.outer_html);
        let own = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .next()?;
        let raw = own.value().attr(name)?;
        if matches!(name, "href" | "src") {
            Some(self.resolve(raw))
        } else {
            Some(raw.to_string())
        }
    }

    /// All descendants carrying class `class`, in document order.
    pub fn find_all(&self, class: &str) -> Vec<Element> {
        let Some(selector) = class_selector(class) else {
            return Vec::new();
        };
        let fragment = Html::parse_fragment(&self.outer_html);
        fragment
            .select(&selector)
            .map(|el| Element::new(el.html(), self.base.clone()))
            .collect()
    }

    /// First descendant with tag `tag`.
    pub fn first_by_tag(&self, tag: &str) -> Option<Element> {
        let selector = Selector::parse(tag).ok()?;
        let fragment = Html::parse_fragment(&self.outer_html);
        let found = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .flat_map(|own| own.select(&selector).filter(move |el| el.id() != own.id()))
            .next()
            .map(|el| Element::new(el.html(), self.base.clone()));
        found
    }

    fn resolve(&self, raw: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => raw.to_string(),
        }
    }
}

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol",
    "p", "pre", "section", "table", "tr", "ul",
];

fn collect_text(el: ElementRef<'_>, line: &mut String, lines: &mut Vec<String>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => line.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if matches!(name, "script" | "style" | "template") {
                    continue;
                }
                if name == "br" {
                    flush_line(line, lines);
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    flush_line(line, lines);
                }
                collect_text(child, line, lines);
                if block {
                    flush_line(line, lines);
                }
            }
            _ => {}
        }
    }
}

fn flush_line(line: &mut String, lines: &mut Vec<String>) {
    let collapsed = line.split_whitespace().join(" ");
    if !collapsed.is_empty() {
        lines.push(collapsed);
    }
    line.clear();
}

fn class_selector(class: &str) -> Option<Selector> {
    match Selector::parse(&format!(".{}", class.trim())) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(%class, error = %e, "Invalid class selector");
            None
        }
    }
}

/// First element with class `class` in a full HTML document.
pub(crate) fn first_by_class(html: &str, base: &Url, class: &str) -> Option<Element> {
    let selector = class_selector(class)?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .next()
        .map(|el| Element::new(el.html(), Some(base.clone())))
}
