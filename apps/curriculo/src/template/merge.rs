//! Template merge engine.
//!
//! `merge` runs an ordered list of pure steps over the template text. Each
//! step takes the current document and returns a new one, so every rule can
//! be exercised on its own. Structural steps (labeled lines, optional
//! sections, skills, experience) run before any placeholder is blanked, so a
//! section's emptiness is decided from the form values and not from text
//! that has already been stripped.

use regex::{Captures, Regex};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, trace};

use crate::template::sections;
use crate::template::tokens;
use crate::template::values::{Entry, FormValues};

/// Shown in place of a preview when no template is available.
pub const TEMPLATE_NOT_LOADED_MESSAGE: &str = "Template not loaded. Please reload the page.";

/// Sections governed by a single scalar field: `(heading, field)`.
const SCALAR_SECTIONS: &[(&str, &str)] = &[("Summary", "summary"), ("Education", "education")];
const SKILLS_SECTION: &str = "Core Skills";
const SKILLS_GROUP: &str = "skills";
const EXPERIENCE_SECTION: &str = "Experience";
const EXPERIENCE_FIELD: &str = "experience";
/// Joins instantiated experience rows.
const ROW_SEPARATOR: &str = "\n\n---\n\n";
/// Markdown hard line break between synthesized skill lines.
const HARD_BREAK: &str = "  \n";
/// Private-use stand-in for `{` inside inserted values, so user text is never
/// read back as a placeholder. Turned back into `{` by the last token step.
const LITERAL_BRACE: &str = "\u{E000}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("{}", TEMPLATE_NOT_LOADED_MESSAGE)]
    TemplateNotLoaded,
}

/// Inputs shared by every step. `template` is the original (line-ending
/// normalized) template, needed to find the experience row stamp after the
/// working document has been rewritten.
struct Context<'a> {
    template: &'a str,
    values: &'a FormValues,
}

type Step = fn(String, &Context<'_>) -> String;

const PIPELINE: &[(&str, Step)] = &[
    ("drop_empty_labeled_lines", drop_empty_labeled_lines),
    ("resolve_scalar_sections", resolve_scalar_sections),
    ("render_skills", render_skills),
    ("expand_experience", expand_experience),
    ("substitute_placeholders", substitute_placeholders),
    ("strip_unresolved", strip_unresolved),
    ("restore_literal_braces", restore_literal_braces),
    ("tidy_dividers", tidy_dividers),
    ("collapse_blank_lines", collapse_blank_lines),
];

/// Merges form values into a Markdown template.
///
/// Missing values never fail the merge; they read as empty. The only error is
/// a blank template.
pub fn merge(template: &str, values: &FormValues) -> Result<String, MergeError> {
    if template.trim().is_empty() {
        return Err(MergeError::TemplateNotLoaded);
    }

    let template = template.replace("\r\n", "\n");
    let cx = Context {
        template: &template,
        values,
    };

    let merged = PIPELINE.iter().fold(template.clone(), |doc, (name, step)| {
        let next = step(doc, &cx);
        trace!(step = *name, bytes = next.len(), "merge step applied");
        next
    });

    debug!(
        template_bytes = template.len(),
        output_bytes = merged.len(),
        "Template merged"
    );
    Ok(merged)
}

/// Human label for a field key: `cloud_platforms` → `Cloud Platforms`.
pub fn field_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        at_word_start = !ch.is_alphanumeric();
    }
    label
}

// ────────────────────────────────────────────────────────────────────────────
// Steps
// ────────────────────────────────────────────────────────────────────────────

fn drop_empty_labeled_lines(doc: String, cx: &Context<'_>) -> String {
    drop_labeled_lines(&doc, |token| {
        cx.values
            .resolve(token)
            .map_or(true, |value| value.trim().is_empty())
    })
}

fn resolve_scalar_sections(doc: String, cx: &Context<'_>) -> String {
    SCALAR_SECTIONS
        .iter()
        .fold(doc, |doc, (heading, field)| {
            if cx.values.scalar(field).trim().is_empty() {
                sections::remove_section(&doc, heading)
            } else {
                doc
            }
        })
}

fn render_skills(doc: String, cx: &Context<'_>) -> String {
    let filled: Vec<String> = cx
        .values
        .group(SKILLS_GROUP)
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| literal(&format!("{}: {}", field_label(key), value.trim())))
        .collect();

    if filled.is_empty() {
        sections::remove_section(&doc, SKILLS_SECTION)
    } else {
        sections::replace_section_body(&doc, SKILLS_SECTION, &filled.join(HARD_BREAK))
    }
}

fn expand_experience(doc: String, cx: &Context<'_>) -> String {
    let entries: Vec<Entry<'_>> = cx
        .values
        .entries(EXPERIENCE_FIELD)
        .into_iter()
        .filter(|entry| entry.is_filled())
        .collect();

    let (doc, first_block) = remove_entry_blocks(&doc);

    if entries.is_empty() {
        return sections::remove_section(&doc, EXPERIENCE_SECTION);
    }

    let Some(row) = row_template(cx.template) else {
        return doc;
    };

    let rows = entries
        .iter()
        .map(|entry| instantiate_row(row, entry))
        .collect::<Vec<_>>()
        .join(ROW_SEPARATOR);

    if let Some(expanded) = sections::insert_after_heading(&doc, EXPERIENCE_SECTION, &rows) {
        return expanded;
    }
    match first_block {
        Some(at) => sections::insert_at(&doc, at, &rows),
        None => doc,
    }
}

fn substitute_placeholders(doc: String, cx: &Context<'_>) -> String {
    tokens::placeholder()
        .replace_all(&doc, |caps: &Captures<'_>| {
            cx.values
                .resolve(&caps[1])
                .map_or_else(|| caps[0].to_string(), |value| literal(&value))
        })
        .into_owned()
}

fn strip_unresolved(doc: String, _cx: &Context<'_>) -> String {
    tokens::any_placeholder().replace_all(&doc, "").into_owned()
}

fn restore_literal_braces(doc: String, _cx: &Context<'_>) -> String {
    doc.replace(LITERAL_BRACE, "{")
}

/// Drops divider lines left without content on one side: before the first
/// content line, after the last one, or right after another divider.
/// A leading front-matter block keeps both of its fences.
fn tidy_dividers(doc: String, _cx: &Context<'_>) -> String {
    let (front_matter, body) = doc.split_at(front_matter_len(&doc));
    let mut kept: Vec<&str> = vec![front_matter];
    let mut seen_content = false;
    let mut open_divider: Option<usize> = None;

    for line in body.split_inclusive('\n') {
        if line.trim().is_empty() {
            kept.push(line);
        } else if sections::is_divider(line) {
            if seen_content && open_divider.is_none() {
                open_divider = Some(kept.len());
                kept.push(line);
            }
        } else {
            seen_content = true;
            open_divider = None;
            kept.push(line);
        }
    }

    if let Some(index) = open_divider {
        kept.remove(index);
    }
    kept.concat()
}

fn collapse_blank_lines(doc: String, _cx: &Context<'_>) -> String {
    static WHITESPACE_LINE: OnceLock<Regex> = OnceLock::new();
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    let whitespace_line = WHITESPACE_LINE
        .get_or_init(|| Regex::new(r"(?m)^[ \t]+$").expect("whitespace pattern is valid"));
    let blank_run = BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

    let doc = whitespace_line.replace_all(&doc, "");
    blank_run.replace_all(&doc, "\n\n").trim().to_string()
}

/// Escapes `{` in text being spliced into the working document.
fn literal(value: &str) -> String {
    value.replace('{', LITERAL_BRACE)
}

/// Byte length of a leading YAML front-matter block (`---`, `key: value`
/// lines, `---`), closing fence included. 0 when the document has none.
fn front_matter_len(doc: &str) -> usize {
    let mut offset = 0;
    for (index, line) in doc.split_inclusive('\n').enumerate() {
        offset += line.len();
        let text = line.trim_end();
        match index {
            0 if text == "---" => {}
            0 => return 0,
            1 if !is_front_matter_key(text) => return 0,
            1 => {}
            _ if text == "---" => return offset,
            _ if text.is_empty() || sections::heading(text).is_some() => return 0,
            _ => {}
        }
    }
    0
}

fn is_front_matter_key(line: &str) -> bool {
    line.split_once(':').is_some_and(|(key, _)| {
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Experience helpers
// ────────────────────────────────────────────────────────────────────────────

/// A `###` heading carrying entry tokens, e.g. `### {{exp1_company}} — {{exp1_role}}`.
fn is_entry_heading(line: &str) -> bool {
    matches!(sections::heading(line), Some((3, title)) if tokens::entry_token().is_match(title))
}

/// Index of the line that ends the block starting at `from`: the next
/// divider or heading, or `lines.len()`.
fn block_end(lines: &[sections::Line<'_>], from: usize) -> usize {
    lines[from + 1..]
        .iter()
        .position(|line| sections::is_divider(line.text) || sections::heading(line.text).is_some())
        .map_or(lines.len(), |offset| from + 1 + offset)
}

/// The first per-entry block of the template, without trailing whitespace.
fn row_template(template: &str) -> Option<&str> {
    let lines = sections::lines(template);
    let start = lines.iter().position(|line| is_entry_heading(line.text))?;
    let end = block_end(&lines, start);
    let end_offset = lines.get(end).map_or(template.len(), |line| line.start);
    Some(template[lines[start].start..end_offset].trim_end())
}

/// Removes every per-entry block. A divider that only separates two blocks
/// goes with them; the divider closing the last block stays.
///
/// Returns the new document and the offset where the first block was.
fn remove_entry_blocks(doc: &str) -> (String, Option<usize>) {
    let lines = sections::lines(doc);
    let mut out = String::with_capacity(doc.len());
    let mut first_block = None;
    let mut i = 0;

    while i < lines.len() {
        if !is_entry_heading(lines[i].text) {
            out.push_str(lines[i].text);
            i += 1;
            continue;
        }

        first_block.get_or_insert(out.len());
        let mut next = block_end(&lines, i);
        if next < lines.len() && sections::is_divider(lines[next].text) {
            let following = lines[next + 1..]
                .iter()
                .position(|line| !line.is_blank())
                .map(|offset| next + 1 + offset);
            if let Some(k) = following.filter(|k| is_entry_heading(lines[*k].text)) {
                next = k;
            }
        }
        i = next;
    }

    (out, first_block)
}

fn instantiate_row(row: &str, entry: &Entry<'_>) -> String {
    let kept = drop_labeled_lines(row, |token| {
        tokens::entry_field(token).is_some_and(|field| entry.field(field).trim().is_empty())
    });
    tokens::entry_token()
        .replace_all(&kept, |caps: &Captures<'_>| literal(&entry.field(&caps[1])))
        .trim_end()
        .to_string()
}

/// Removes `Label: {{token}}` lines whose token `is_empty` reports as blank,
/// trailing newline included.
fn drop_labeled_lines(doc: &str, is_empty: impl Fn(&str) -> bool) -> String {
    doc.split_inclusive('\n')
        .filter(|line| !tokens::labeled_token(line).is_some_and(&is_empty))
        .collect()
}
