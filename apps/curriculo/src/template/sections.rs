//! Line-level Markdown structure: headings, dividers and the sections they
//! delimit. Everything here works on byte offsets into a `\n`-separated
//! document so callers can splice without reparsing.

/// A document line with its byte offset. `text` keeps the trailing `\n`.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub start: usize,
    pub text: &'a str,
}

impl Line<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn lines(doc: &str) -> Vec<Line<'_>> {
    let mut start = 0;
    doc.split_inclusive('\n')
        .map(|text| {
            let line = Line { start, text };
            start += text.len();
            line
        })
        .collect()
}

/// ATX heading level and title, e.g. `## Core Skills` → `(2, "Core Skills")`.
pub fn heading(line: &str) -> Option<(usize, &str)> {
    let line = line.trim_end();
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((level, rest.trim()))
}

/// A thematic break written with dashes (`---`, `-----`).
pub fn is_divider(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Byte ranges of one section.
///
/// `start..body_start` is the heading line, `body_start..body_end` the
/// content, and `body_end..end` the divider that closes the section (empty
/// when the section runs into the next heading or the end of the document).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub start: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub end: usize,
}

/// Locates the first level-2 section whose title matches (ASCII
/// case-insensitive).
pub fn find_section(doc: &str, title: &str) -> Option<SectionSpan> {
    let lines = lines(doc);
    let index = lines.iter().position(|line| {
        matches!(heading(line.text), Some((2, t)) if t.eq_ignore_ascii_case(title))
    })?;

    let head = lines[index];
    let mut span = SectionSpan {
        start: head.start,
        body_start: head.end(),
        body_end: doc.len(),
        end: doc.len(),
    };

    for line in &lines[index + 1..] {
        if heading(line.text).is_some() {
            span.body_end = line.start;
            span.end = line.start;
            break;
        }
        if is_divider(line.text) {
            span.body_end = line.start;
            span.end = line.end();
            break;
        }
    }

    Some(span)
}

/// Deletes the section (heading, content and closing divider). Unknown
/// titles leave the document untouched.
pub fn remove_section(doc: &str, title: &str) -> String {
    match find_section(doc, title) {
        Some(span) => {
            let mut out = String::with_capacity(doc.len());
            out.push_str(&doc[..span.start]);
            out.push_str(&doc[span.end..]);
            out
        }
        None => doc.to_string(),
    }
}

/// Replaces the section content with `body`, keeping the heading and the
/// closing divider.
pub fn replace_section_body(doc: &str, title: &str, body: &str) -> String {
    match find_section(doc, title) {
        Some(span) => {
            let mut out = String::with_capacity(doc.len() + body.len());
            out.push_str(&doc[..span.body_start]);
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(body);
            out.push_str("\n\n");
            out.push_str(&doc[span.body_end..]);
            out
        }
        None => doc.to_string(),
    }
}

/// Inserts `text` on its own lines right after the heading of `title`.
/// Returns `None` when the section does not exist.
pub fn insert_after_heading(doc: &str, title: &str, text: &str) -> Option<String> {
    let span = find_section(doc, title)?;
    Some(insert_at(doc, span.body_start, text))
}

/// Inserts `text` as a standalone block at byte offset `at`.
pub fn insert_at(doc: &str, at: usize, text: &str) -> String {
    let mut out = String::with_capacity(doc.len() + text.len() + 4);
    out.push_str(&doc[..at]);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(text);
    out.push_str("\n\n");
    out.push_str(&doc[at..]);
    out
}
