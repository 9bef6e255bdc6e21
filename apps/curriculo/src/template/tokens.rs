//! Placeholder grammar shared by the merge steps.
//!
//! A placeholder is `{{name}}`; whitespace inside the braces is tolerated.
//! Repeatable entries use index-suffixed names such as `{{exp2_company}}`.

use regex::Regex;
use std::sync::OnceLock;

/// Any resolvable placeholder. Capture 1 is the token name.
pub fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Anything brace-delimited, including malformed tokens like `{{ }}` or
/// `{{two words}}`. Used by the final stripping pass.
pub fn any_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[^}]*\}\}").expect("fallback pattern is valid"))
}

/// A Repeatable entry token. Capture 1 is the entry field (`company` in
/// `{{exp1_company}}`).
pub fn entry_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*exp\d+_([A-Za-z0-9_]+)\s*\}\}").expect("entry pattern is valid")
    })
}

/// Field name of an entry token name: `exp2_start_date` → `start_date`.
pub fn entry_field(token: &str) -> Option<&str> {
    let rest = token.strip_prefix("exp")?;
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    rest[digits..].strip_prefix('_').filter(|field| !field.is_empty())
}

/// A line made of a label and exactly one placeholder, e.g. `Phone: {{phone}}`.
/// Capture 1 is the label, capture 2 the token name.
fn labeled_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^{}:#\s][^{}:]*):[ \t]*\{\{\s*([^{}\s]+)\s*\}\}[ \t]*$")
            .expect("labeled line pattern is valid")
    })
}

/// Returns the token name when `line` is a labeled single-placeholder line.
/// The trailing newline, if any, is ignored.
pub fn labeled_token(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    labeled_line()
        .captures(line)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Every token name referenced by `text`, in order of appearance, without
/// duplicates.
pub fn token_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder().captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_tolerates_inner_whitespace() {
        let caps = placeholder().captures("Hi {{ name }}!").unwrap();
        assert_eq!(&caps[1], "name");
    }

    #[test]
    fn test_entry_token_extracts_field() {
        let caps = entry_token().captures("{{exp12_start_date}}").unwrap();
        assert_eq!(&caps[1], "start_date");
        assert!(entry_token().captures("{{experience}}").is_none());
    }

    #[test]
    fn test_entry_field() {
        assert_eq!(entry_field("exp1_company"), Some("company"));
        assert_eq!(entry_field("exp10_start_date"), Some("start_date"));
        assert_eq!(entry_field("expertise"), None);
        assert_eq!(entry_field("exp_role"), None);
        assert_eq!(entry_field("exp3_"), None);
    }

    #[test]
    fn test_labeled_token_matches_contact_lines() {
        assert_eq!(labeled_token("Phone: {{phone}}\n"), Some("phone"));
        assert_eq!(labeled_token("LinkedIn:{{linkedin}}"), Some("linkedin"));
        assert_eq!(labeled_token("E-mail: {{ email }}  "), Some("email"));
    }

    #[test]
    fn test_labeled_token_rejects_other_lines() {
        assert_eq!(labeled_token("{{phone}}"), None);
        assert_eq!(labeled_token("## Summary: {{summary}}"), None);
        assert_eq!(labeled_token("Phone: {{phone}} / {{mobile}}"), None);
        assert_eq!(labeled_token("Call me: now {{phone}}"), None);
    }

    #[test]
    fn test_token_names_dedups_in_order() {
        let names = token_names("{{b}} {{a}} {{b}} {{exp1_role}}");
        assert_eq!(names, vec!["b", "a", "exp1_role"]);
    }
}
