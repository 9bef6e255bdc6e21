//! Built-in model used when a template cannot be fetched from storage.

/// Fallback résumé template. Uses the same token grammar as stored models.
pub const DEFAULT_TEMPLATE: &str = "# {{name}}
{{headline}}
{{location}}
Email: {{email}}
Phone: {{phone}}
LinkedIn: {{linkedin}}
GitHub: {{github}}

---

## Summary
{{summary}}

---

## Core Skills
{{skills_languages}}
{{skills_frameworks}}
{{skills_cloud}}
{{skills_observability}}

---

## Experience

### {{exp1_company}} — {{exp1_role}}
{{exp1_location}} — {{exp1_period}}
{{exp1_description}}

---

### {{exp2_company}} — {{exp2_role}}
{{exp2_location}} — {{exp2_period}}
{{exp2_description}}

---

## Education
{{education}}";

/// Schema matching [`DEFAULT_TEMPLATE`].
pub const DEFAULT_SCHEMA: &str = r#"{
    "name": "{{name}}",
    "headline": "{{headline}}",
    "location": "{{location}}",
    "contact": {
        "email": "{{email}}",
        "phone": "{{phone}}",
        "linkedin": "{{linkedin}}",
        "github": "{{github}}"
    },
    "summary": "{{summary}}",
    "skills": {
        "languages": "{{skills_languages}}",
        "frameworks": "{{skills_frameworks}}",
        "cloud": "{{skills_cloud}}",
        "observability": "{{skills_observability}}"
    },
    "experience": [
        {
            "company": "{{exp1_company}}",
            "role": "{{exp1_role}}",
            "location": "{{exp1_location}}",
            "period": "{{exp1_period}}",
            "description": "{{exp1_description}}"
        },
        {
            "company": "{{exp2_company}}",
            "role": "{{exp2_role}}",
            "location": "{{exp2_location}}",
            "period": "{{exp2_period}}",
            "description": "{{exp2_description}}"
        }
    ],
    "education": "{{education}}"
}"#;
