//! The line-oriented markup of the index files.
//!
//! Index files are self-generated: one header line (`<h1 ...>`) followed by
//! one `<p>` entry per line. Lines are parsed individually with `scraper`, so
//! attribute order or quoting style in hand-edited lines does not matter.
//! Lines that are neither header nor entry are kept as they are.

use scraper::{Html, Selector};
use std::io;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLine {
    Header,
    Entry { href: String },
    Other,
}

pub fn classify(line: &str) -> IndexLine {
    if is_header(line) {
        return IndexLine::Header;
    }
    match entry_href(line) {
        Some(href) => IndexLine::Entry { href },
        None => IndexLine::Other,
    }
}

pub fn is_header(line: &str) -> bool {
    line.trim_start().to_ascii_lowercase().starts_with("<h1")
}

/// Link target of the first anchor on the line.
pub fn entry_href(line: &str) -> Option<String> {
    if !line.contains("href") {
        return None;
    }
    let link = Selector::parse("a[href]").ok()?;
    let fragment = Html::parse_fragment(line);
    let href = fragment
        .select(&link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);
    href
}

/// Escape text placed between tags.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Read a file as lines; a missing file reads as empty.
pub async fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Replace `path` with `lines`, newline-terminated. The new content is written
/// next to the target and renamed over it, so readers never see a partial file.
pub async fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await
}
