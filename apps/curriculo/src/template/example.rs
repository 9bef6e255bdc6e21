//! Form values derived from a schema: an empty form to start editing, and
//! deterministic sample data for previewing a template in the model editor.

use serde_json::{json, Map, Value};

use crate::template::merge::field_label;
use crate::template::schema::{FieldSpec, Schema};
use crate::template::values::FormValues;

/// Empty strings for every declared field and one empty record per declared
/// Repeatable row.
pub fn blank_values(schema: &Schema) -> FormValues {
    build(schema, |_, _, _| String::new())
}

/// Sample data keyed by field name, for previews of templates nobody has
/// filled in yet.
pub fn example_values(schema: &Schema) -> FormValues {
    build(schema, |group, field, index| example_text(group, field, index))
}

fn build(schema: &Schema, text: impl Fn(Option<&str>, &str, usize) -> String) -> FormValues {
    let mut values = FormValues::new();
    for (key, spec) in schema.fields() {
        let value = match spec {
            FieldSpec::Scalar(_) => Value::String(text(None, key, 0)),
            FieldSpec::Group(members) => {
                let group: Map<String, Value> = members
                    .iter()
                    .map(|(name, _)| (name.clone(), Value::String(text(Some(key), name, 0))))
                    .collect();
                Value::Object(group)
            }
            FieldSpec::Repeatable { fields, rows } => {
                let records: Vec<Value> = (0..rows.len())
                    .map(|index| {
                        let record: Map<String, Value> = fields
                            .iter()
                            .map(|name| {
                                (name.clone(), Value::String(text(Some(key), name, index)))
                            })
                            .collect();
                        Value::Object(record)
                    })
                    .collect();
                json!(records)
            }
        };
        values.set(key, value);
    }
    values
}

fn example_text(group: Option<&str>, field: &str, index: usize) -> String {
    let n = index + 1;
    match (group, field) {
        (None, "name") => "Jane Doe".to_string(),
        (None, "headline") => "Full Stack Developer".to_string(),
        (None, "location") => "São Paulo, SP, Brazil".to_string(),
        (None, "summary") => "Developer with over five years of experience building web \
            platforms, focused on scalable and maintainable systems."
            .to_string(),
        (None, "education") => "BSc in Computer Science, University of São Paulo (2015-2019)".to_string(),
        (Some("contact"), "email") => "jane.doe@email.com".to_string(),
        (Some("contact"), "phone") => "+55 11 98765-4321".to_string(),
        (Some("contact"), "linkedin") => "https://linkedin.com/in/janedoe".to_string(),
        (Some("contact"), "github") => "https://github.com/janedoe".to_string(),
        (Some("skills"), "languages") => "JavaScript, TypeScript, Python, Rust".to_string(),
        (Some("skills"), "frameworks") => "React, Next.js, Axum, Express".to_string(),
        (Some("skills"), "cloud") => "AWS, Docker, Kubernetes".to_string(),
        (Some("skills"), "observability") => "Prometheus, Grafana, OpenTelemetry".to_string(),
        (Some("experience"), "company") => format!("Company {n}"),
        (Some("experience"), "role") => format!("Role {n}"),
        (Some("experience"), "location") => "São Paulo, SP".to_string(),
        (Some("experience"), "period") => format!("Jan {} - Dec {}", 2019 + n, 2021 + n),
        (Some("experience"), "description") => format!("Description of experience {n}."),
        (_, other) => format!("Example {}", field_label(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::defaults::{DEFAULT_SCHEMA, DEFAULT_TEMPLATE};
    use crate::template::merge::merge;

    #[test]
    fn test_blank_values_mirror_schema_shape() {
        let schema = Schema::parse(DEFAULT_SCHEMA).unwrap();
        let values = blank_values(&schema);
        assert_eq!(values.scalar("name"), "");
        assert_eq!(values.group("contact").len(), 4);
        let entries = values.entries("experience");
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_filled());
    }

    #[test]
    fn test_example_values_fill_known_and_custom_fields() {
        let schema = Schema::parse(
            r#"{"name": "{{name}}", "portfolio_url": "{{portfolio_url}}",
                "experience": [{"company": "{{exp1_company}}", "team": "{{exp1_team}}"}]}"#,
        )
        .unwrap();
        let values = example_values(&schema);
        assert_eq!(values.scalar("name"), "Jane Doe");
        assert_eq!(values.scalar("portfolio_url"), "Example Portfolio Url");
        let entries = values.entries("experience");
        assert_eq!(entries[0].field("company"), "Company 1");
        assert_eq!(entries[0].field("team"), "Example Team");
    }

    #[test]
    fn test_example_values_preview_default_template() {
        let schema = Schema::parse(DEFAULT_SCHEMA).unwrap();
        let out = merge(DEFAULT_TEMPLATE, &example_values(&schema)).unwrap();
        assert!(out.starts_with("# Jane Doe"));
        assert!(out.contains("Email: jane.doe@email.com"));
        assert!(out.contains("Languages: JavaScript, TypeScript, Python, Rust"));
        assert!(out.contains("### Company 2 — Role 2"));
        assert!(!out.contains("{{"));
    }
}
