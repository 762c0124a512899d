// src/parser/markdown.rs
//! Markdown rendering of a parsed resume, used by the download endpoints.

use crate::parser::models::ResumeRecord;

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Not found")
}

/// Render a record as a small Markdown report.
pub fn render_markdown(record: &ResumeRecord) -> String {
    format!(
        r#"# Resume Parsing Results

## Personal Information
- **Name:** {name}
- **Email:** {email}
- **Phone:** {phone}
- **Position:** {position}
- **Experience:** {experience}
- **Education:** {education}

## Summary
{summary}

## Primary Skills
{primary}

## Secondary Skills
{secondary}

## Skills Source
{skills_source}
"#,
        name = field(&record.name),
        email = field(&record.email),
        phone = field(&record.phone),
        position = field(&record.position),
        experience = field(&record.experience),
        education = field(&record.education),
        summary = field(&record.summary),
        primary = record.primary_skills.join(", "),
        secondary = record.secondary_skills.join(", "),
        skills_source = record.skills_source.as_deref().unwrap_or("Not available"),
    )
}
