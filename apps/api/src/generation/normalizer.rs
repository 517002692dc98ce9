//! Field Normalizer: maps whatever shape the generation backend produced
//! onto the editor's [`ResumeRecord`] keys.
//!
//! Each section is decoded in two steps: the section value is classified
//! (`List | Single | Categorized`), then every entry is classified
//! (`Text | Fields`) and mapped through that section's alias table. The
//! tables are plain data so they can be checked on their own.
//!
//! The result is a [`ResumePatch`]: sections that are absent or empty in the
//! payload stay `None` and leave the record untouched.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::resume::{
    AwardEntry, CertificateEntry, EducationEntry, ExperienceEntry, InterestEntry, LanguageEntry,
    ProfileLink, ProjectEntry, PublicationEntry, ReferenceEntry, ResumePatch, Section,
    SectionEntry, SkillEntry, VolunteeringEntry, DEFAULT_LEVEL,
};

// ────────────────────────────────────────────────────────────────────────────
// Alias tables
// ────────────────────────────────────────────────────────────────────────────

/// Where a target field may be read from in a backend object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Key(&'static str),
    /// Rendered as `start - end`; a missing end reads "Present".
    Range {
        start: &'static str,
        end: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text; arrays are joined with ", ".
    Text,
    /// Free text; arrays (bullets, achievements) are joined one per line.
    Lines,
    /// Integer 1–5, defaulting to 3.
    Level,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub target: &'static str,
    pub kind: FieldKind,
    pub sources: &'static [Source],
}

#[derive(Debug, Clone, Copy)]
pub struct SectionSchema {
    pub section: Section,
    /// Payload keys the section may arrive under, preferred first.
    pub payload_keys: &'static [&'static str],
    /// Field that receives a bare-string entry.
    pub text_field: &'static str,
    pub fields: &'static [FieldRule],
}

use FieldKind::{Level, Lines, Text};
use Source::{Key, Range};

const fn rule(
    target: &'static str,
    kind: FieldKind,
    sources: &'static [Source],
) -> FieldRule {
    FieldRule {
        target,
        kind,
        sources,
    }
}

const DATE_RANGE: Source = Range {
    start: "start_date",
    end: "end_date",
};
const DATE_RANGE_CAMEL: Source = Range {
    start: "startDate",
    end: "endDate",
};

pub const EXPERIENCE: SectionSchema = SectionSchema {
    section: Section::Experience,
    payload_keys: &["experience", "work_experience"],
    text_field: "expSummary",
    fields: &[
        rule("expCompany", Text, &[Key("company"), Key("organization"), Key("employer")]),
        rule("expPosition", Text, &[Key("role"), Key("title"), Key("position")]),
        rule(
            "expDate",
            Text,
            &[Key("date"), Key("dates"), Key("duration"), Key("period"), DATE_RANGE, DATE_RANGE_CAMEL],
        ),
        rule("expLocation", Text, &[Key("location")]),
        rule(
            "expSummary",
            Lines,
            &[Key("summary"), Key("description"), Key("achievements"), Key("bullets"), Key("responsibilities")],
        ),
    ],
};

pub const EDUCATION: SectionSchema = SectionSchema {
    section: Section::Education,
    payload_keys: &["education"],
    text_field: "eduSummary",
    fields: &[
        rule(
            "eduInstitute",
            Text,
            &[Key("institution"), Key("institute"), Key("school"), Key("university"), Key("college")],
        ),
        rule("eduType", Text, &[Key("degree"), Key("type"), Key("qualification")]),
        rule("eduArea", Text, &[Key("major"), Key("field"), Key("area")]),
        rule("eduScore", Text, &[Key("gpa"), Key("score"), Key("grade")]),
        rule(
            "eduDate",
            Text,
            &[Key("year"), Key("date"), Key("graduation_date"), DATE_RANGE, DATE_RANGE_CAMEL],
        ),
        rule("eduWebsite", Text, &[Key("website"), Key("url")]),
        rule("eduSummary", Lines, &[Key("summary"), Key("description")]),
    ],
};

pub const SKILLS: SectionSchema = SectionSchema {
    section: Section::Skills,
    payload_keys: &["skills"],
    text_field: "skillName",
    fields: &[
        rule("skillName", Text, &[Key("name"), Key("skill"), Key("title")]),
        rule("skillDescription", Lines, &[Key("description"), Key("summary")]),
        rule("skillKeyword", Text, &[Key("keyword"), Key("keywords"), Key("category")]),
        rule("skillLevel", Level, &[Key("level"), Key("proficiency")]),
    ],
};

pub const LANGUAGES: SectionSchema = SectionSchema {
    section: Section::Languages,
    payload_keys: &["languages"],
    text_field: "langName",
    fields: &[
        rule("langName", Text, &[Key("name"), Key("language")]),
        rule("langDescription", Text, &[Key("description"), Key("fluency")]),
        rule("langLevel", Level, &[Key("level"), Key("proficiency")]),
    ],
};

pub const AWARDS: SectionSchema = SectionSchema {
    section: Section::Awards,
    payload_keys: &["awards"],
    text_field: "awardTitle",
    fields: &[
        rule("awardTitle", Text, &[Key("title"), Key("name"), Key("award")]),
        rule("awardName", Text, &[Key("issuer"), Key("awarder")]),
        rule("awardDate", Text, &[Key("date"), Key("year")]),
        rule("awardWebsite", Text, &[Key("website"), Key("url")]),
        rule("awardSummary", Lines, &[Key("summary"), Key("description")]),
    ],
};

pub const CERTIFICATES: SectionSchema = SectionSchema {
    section: Section::Certificates,
    payload_keys: &["certificates", "certifications"],
    text_field: "certName",
    fields: &[
        rule(
            "certName",
            Text,
            &[Key("name"), Key("title"), Key("certificate"), Key("certification")],
        ),
        rule("certIssuer", Text, &[Key("issuer"), Key("organization"), Key("authority")]),
        rule("certDate", Text, &[Key("date"), Key("year"), Key("issued")]),
        rule("certWebsite", Text, &[Key("website"), Key("url")]),
        rule("certSummary", Lines, &[Key("summary"), Key("description")]),
    ],
};

pub const INTERESTS: SectionSchema = SectionSchema {
    section: Section::Interests,
    payload_keys: &["interests"],
    text_field: "interestName",
    fields: &[
        rule("interestName", Text, &[Key("name"), Key("interest"), Key("title")]),
        rule("interestKeyword", Text, &[Key("keyword"), Key("keywords")]),
    ],
};

pub const PROJECTS: SectionSchema = SectionSchema {
    section: Section::Projects,
    payload_keys: &["projects"],
    text_field: "projectSummary",
    fields: &[
        rule("projectName", Text, &[Key("name"), Key("title")]),
        rule("projectDescription", Text, &[Key("description"), Key("tagline"), Key("role")]),
        rule("projectDate", Text, &[Key("date"), Key("year"), DATE_RANGE, DATE_RANGE_CAMEL]),
        rule("projectWebsite", Text, &[Key("website"), Key("url"), Key("link"), Key("github")]),
        rule("projectSummary", Lines, &[Key("summary"), Key("details"), Key("highlights")]),
        rule(
            "projectKeyword",
            Text,
            &[Key("keywords"), Key("keyword"), Key("tech_stack"), Key("technologies")],
        ),
    ],
};

pub const PUBLICATIONS: SectionSchema = SectionSchema {
    section: Section::Publications,
    payload_keys: &["publications"],
    text_field: "publicationName",
    fields: &[
        rule("publicationName", Text, &[Key("name"), Key("title")]),
        rule("publicationPublisher", Text, &[Key("publisher"), Key("journal"), Key("venue")]),
        rule("publicationDate", Text, &[Key("date"), Key("year")]),
        rule("publicationWebsite", Text, &[Key("website"), Key("url"), Key("link")]),
        rule("publicationSummary", Lines, &[Key("summary"), Key("description"), Key("abstract")]),
    ],
};

pub const VOLUNTEERING: SectionSchema = SectionSchema {
    section: Section::Volunteering,
    payload_keys: &["volunteering", "volunteer"],
    text_field: "volSummary",
    fields: &[
        rule("volOrg", Text, &[Key("organization"), Key("org"), Key("company")]),
        rule("volPosition", Text, &[Key("position"), Key("role"), Key("title")]),
        rule(
            "volDate",
            Text,
            &[Key("date"), Key("duration"), DATE_RANGE, DATE_RANGE_CAMEL],
        ),
        rule("volLocation", Text, &[Key("location")]),
        rule("volWebsite", Text, &[Key("website"), Key("url")]),
        rule("volSummary", Lines, &[Key("summary"), Key("description")]),
    ],
};

pub const REFERENCES: SectionSchema = SectionSchema {
    section: Section::References,
    payload_keys: &["references"],
    text_field: "refSummary",
    fields: &[
        rule("refName", Text, &[Key("name")]),
        rule("refDescription", Text, &[Key("description"), Key("relationship"), Key("title"), Key("role")]),
        rule("refSummary", Lines, &[Key("summary"), Key("contact"), Key("details")]),
    ],
};

/// Every collection the backend can fill. Profile links are synthesized
/// separately from the contact object.
#[cfg(test)]
pub const SCHEMAS: [SectionSchema; 11] = [
    EXPERIENCE,
    EDUCATION,
    SKILLS,
    LANGUAGES,
    AWARDS,
    CERTIFICATES,
    INTERESTS,
    PROJECTS,
    PUBLICATIONS,
    VOLUNTEERING,
    REFERENCES,
];

const CONTACT_FIELDS: &[(&str, &[&str])] = &[
    ("fullName", &["name", "full_name", "fullName"]),
    ("headline", &["role", "title", "headline"]),
    ("email", &["email"]),
    ("phone", &["phone"]),
    ("location", &["location"]),
    ("website", &["website", "portfolio"]),
];

/// `(payload key, network label, icon)` for links synthesized into `profile`.
const LINK_NETWORKS: &[(&str, &str, &str)] = &[
    ("github", "GitHub", "github"),
    ("linkedin", "LinkedIn", "linkedin"),
];

// ────────────────────────────────────────────────────────────────────────────
// Tagged decode
// ────────────────────────────────────────────────────────────────────────────

/// Shape of one entry as the backend sent it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryForm<'a> {
    Text(&'a str),
    Fields(&'a Map<String, Value>),
}

impl<'a> EntryForm<'a> {
    pub fn decode(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(EntryForm::Text(s)),
            Value::Object(map) if !map.is_empty() => Some(EntryForm::Fields(map)),
            _ => None,
        }
    }
}

/// Shape of a whole section value.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionForm<'a> {
    List(Vec<EntryForm<'a>>),
    Single(EntryForm<'a>),
    /// `{category: [name, ...]}`, only meaningful for skills.
    Categorized(Vec<(&'a str, &'a str)>),
}

impl<'a> SectionForm<'a> {
    pub fn decode(section: Section, value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                let entries: Vec<_> = items.iter().filter_map(EntryForm::decode).collect();
                (!entries.is_empty()).then_some(SectionForm::List(entries))
            }
            Value::Object(map) if section == Section::Skills && is_categorized(map) => {
                let pairs: Vec<_> = map
                    .iter()
                    .flat_map(|(category, names)| {
                        names
                            .as_array()
                            .into_iter()
                            .flatten()
                            .filter_map(Value::as_str)
                            .filter(|n| !n.trim().is_empty())
                            .map(move |n| (category.as_str(), n))
                    })
                    .collect();
                (!pairs.is_empty()).then_some(SectionForm::Categorized(pairs))
            }
            other => EntryForm::decode(other).map(SectionForm::Single),
        }
    }
}

fn is_categorized(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.values().all(Value::is_array)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Maps a backend résumé payload onto a partial record. Never fails: any
/// missing or malformed part is simply left out of the patch.
pub fn normalize(payload: &Value) -> ResumePatch {
    let Some(root) = payload.as_object() else {
        warn!("Generation payload is not an object; nothing to merge");
        return ResumePatch::default();
    };

    let contacts = contact_sources(root);
    let contact = |target: &str| -> Option<String> {
        let (_, keys) = CONTACT_FIELDS.iter().find(|(t, _)| *t == target)?;
        contacts
            .iter()
            .find_map(|source| first_text(source, keys))
    };

    let patch = ResumePatch {
        full_name: contact("fullName"),
        headline: contact("headline"),
        email: contact("email"),
        phone: contact("phone"),
        location: contact("location"),
        website: contact("website"),
        summary: root.get("summary").and_then(summary_text),
        profile: profile_links(&contacts),
        experience: decode_section::<ExperienceEntry>(root, &EXPERIENCE),
        education: decode_section::<EducationEntry>(root, &EDUCATION),
        skills: decode_section::<SkillEntry>(root, &SKILLS),
        languages: decode_section::<LanguageEntry>(root, &LANGUAGES),
        awards: decode_section::<AwardEntry>(root, &AWARDS),
        certificates: decode_section::<CertificateEntry>(root, &CERTIFICATES),
        interests: decode_section::<InterestEntry>(root, &INTERESTS),
        projects: decode_section::<ProjectEntry>(root, &PROJECTS),
        publications: decode_section::<PublicationEntry>(root, &PUBLICATIONS),
        volunteering: decode_section::<VolunteeringEntry>(root, &VOLUNTEERING),
        references: decode_section::<ReferenceEntry>(root, &REFERENCES),
    };

    debug!("Normalized generation payload (empty patch: {})", patch.is_empty());
    patch
}

/// Objects searched for contact details, in priority order. The payload
/// root comes last: the backend's flat shape is `{name, title, contact}`.
fn contact_sources(root: &Map<String, Value>) -> Vec<&Map<String, Value>> {
    let profile = root.get("profile").and_then(Value::as_object);
    [
        profile,
        profile.and_then(|p| p.get("contact")).and_then(Value::as_object),
        root.get("contact").and_then(Value::as_object),
        Some(root),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn summary_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Object(map) => first_text(map, &["content", "text", "summary"])?,
        other => render(other, Lines)?,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn profile_links(contacts: &[&Map<String, Value>]) -> Option<Vec<ProfileLink>> {
    let links: Vec<ProfileLink> = LINK_NETWORKS
        .iter()
        .filter_map(|(key, network, icon)| {
            let url = contacts.iter().find_map(|c| first_text(c, &[*key]))?;
            Some(ProfileLink {
                profile_network: network.to_string(),
                profile_username: username_from_url(&url),
                profile_website: url,
                profile_icon: icon.to_string(),
            })
        })
        .collect();
    (!links.is_empty()).then_some(links)
}

/// Last path segment of a profile URL (`https://github.com/ada/` → `ada`).
fn username_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn decode_section<T: SectionEntry>(
    root: &Map<String, Value>,
    schema: &SectionSchema,
) -> Option<Vec<T>> {
    // First alias carrying usable entries; an empty `experience` must not
    // hide a filled `work_experience`.
    let form = schema
        .payload_keys
        .iter()
        .find_map(|k| root.get(*k).and_then(|v| SectionForm::decode(schema.section, v)))?;

    let rows: Vec<Map<String, Value>> = match form {
        SectionForm::List(entries) => entries.into_iter().map(|e| build_entry(schema, e)).collect(),
        SectionForm::Single(entry) => vec![build_entry(schema, entry)],
        SectionForm::Categorized(pairs) => pairs
            .into_iter()
            .map(|(category, name)| {
                let mut row = blank_row(schema);
                row.insert(schema.text_field.to_string(), Value::from(name));
                row.insert("skillKeyword".to_string(), Value::from(category));
                row
            })
            .collect(),
    };

    let entries: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(Value::Object(row)) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Dropping malformed {} entry: {e}", schema.section);
                None
            }
        })
        .collect();
    (!entries.is_empty()).then_some(entries)
}

fn blank_row(schema: &SectionSchema) -> Map<String, Value> {
    schema
        .fields
        .iter()
        .map(|f| {
            let blank = match f.kind {
                Level => Value::from(DEFAULT_LEVEL),
                Text | Lines => Value::from(""),
            };
            (f.target.to_string(), blank)
        })
        .collect()
}

fn build_entry(schema: &SectionSchema, form: EntryForm<'_>) -> Map<String, Value> {
    let mut row = blank_row(schema);
    match form {
        EntryForm::Text(text) => {
            row.insert(schema.text_field.to_string(), Value::from(text));
        }
        EntryForm::Fields(fields) => {
            for rule in schema.fields {
                if let Some(value) = resolve(fields, rule) {
                    row.insert(rule.target.to_string(), value);
                }
            }
        }
    }
    row
}

fn resolve(fields: &Map<String, Value>, rule: &FieldRule) -> Option<Value> {
    rule.sources.iter().find_map(|source| match (source, rule.kind) {
        (Key(key), Level) => fields.get(*key).and_then(level).map(Value::from),
        (Key(key), kind) => fields.get(*key).and_then(|v| render(v, kind)).map(Value::from),
        (Range { start, end }, Text | Lines) => {
            let start = fields.get(*start).and_then(|v| render(v, Text))?;
            let end = fields
                .get(*end)
                .and_then(|v| render(v, Text))
                .unwrap_or_else(|| "Present".to_string());
            Some(Value::from(format!("{start} - {end}")))
        }
        (Range { .. }, Level) => None,
    })
}

/// Text rendering of a scalar or list; `None` when there is nothing to show.
fn render(value: &Value, kind: FieldKind) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(|i| render(i, Text)).collect();
            let separator = if kind == Lines { "\n" } else { ", " };
            parts.join(separator)
        }
        Value::Null | Value::Bool(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn level(value: &Value) -> Option<i64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?.round() as i64,
        Value::String(s) => s.trim().parse::<f64>().ok()?.round() as i64,
        _ => return None,
    };
    Some(raw.clamp(1, 5))
}

fn first_text(source: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| source.get(*k).and_then(|v| render(v, Text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn merged(payload: Value) -> ResumeRecord {
        let mut record = ResumeRecord::new();
        record.merge_patch(normalize(&payload));
        record
    }

    #[test]
    fn test_alias_tables_cover_every_entry_field() {
        let blank = serde_json::to_value(ResumeRecord::new()).unwrap();
        for schema in SCHEMAS {
            let expected: BTreeSet<String> = blank[schema.section.as_str()][0]
                .as_object()
                .unwrap()
                .keys()
                .cloned()
                .collect();
            let targets: BTreeSet<String> =
                schema.fields.iter().map(|f| f.target.to_string()).collect();
            assert_eq!(targets, expected, "{}", schema.section);
            assert!(
                targets.contains(schema.text_field),
                "{} text field",
                schema.section
            );
        }
    }

    #[test]
    fn test_alias_tables_have_no_duplicate_sources_per_field() {
        for schema in SCHEMAS {
            for field in schema.fields {
                let unique: BTreeSet<_> = field.sources.iter().map(|s| format!("{s:?}")).collect();
                assert_eq!(unique.len(), field.sources.len(), "{}", field.target);
            }
        }
    }

    #[test]
    fn test_skills_from_bare_strings() {
        let record = merged(json!({"skills": ["Python"]}));
        assert_eq!(
            record.skills,
            vec![SkillEntry {
                skill_name: "Python".to_string(),
                skill_description: String::new(),
                skill_keyword: String::new(),
                skill_level: 3,
            }]
        );
        let blank = ResumeRecord::new();
        assert_eq!(record.experience, blank.experience);
        assert_eq!(record.education, blank.education);
        assert_eq!(record.summary, blank.summary);
    }

    #[test]
    fn test_summary_only_leaves_collections_alone() {
        let mut record = ResumeRecord::new();
        record.experience[0].exp_company = "Acme".to_string();
        record.education[0].edu_institute = "MIT".to_string();
        let before = record.clone();

        record.merge_patch(normalize(&json!({"summary": "X"})));

        assert_eq!(record.summary, "X");
        assert_eq!(record.experience, before.experience);
        assert_eq!(record.education, before.education);
        assert_eq!(record.skills, before.skills);
        assert_eq!(record.profile, before.profile);
    }

    #[test]
    fn test_experience_string_becomes_summary() {
        let record = merged(json!({"experience": "Five years building payment systems"}));
        assert_eq!(
            record.experience,
            vec![ExperienceEntry {
                exp_summary: "Five years building payment systems".to_string(),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn test_experience_objects_use_aliases() {
        let record = merged(json!({"experience": [{
            "company": "Acme",
            "title": "Backend Engineer",
            "start_date": "2019",
            "location": "Remote",
            "achievements": ["Cut p99 latency by 40%", "Led 3 migrations"]
        }]}));
        assert_eq!(
            record.experience,
            vec![ExperienceEntry {
                exp_company: "Acme".to_string(),
                exp_position: "Backend Engineer".to_string(),
                exp_date: "2019 - Present".to_string(),
                exp_location: "Remote".to_string(),
                exp_summary: "Cut p99 latency by 40%\nLed 3 migrations".to_string(),
            }]
        );
    }

    #[test]
    fn test_education_date_from_year_or_date() {
        let record = merged(json!({"education": [
            {"institution": "MIT", "degree": "BSc", "year": 2018, "gpa": 3.9},
            {"school": "ETH", "degree": "MSc", "date": "2020"}
        ]}));
        assert_eq!(record.education[0].edu_date, "2018");
        assert_eq!(record.education[0].edu_score, "3.9");
        assert_eq!(record.education[1].edu_institute, "ETH");
        assert_eq!(record.education[1].edu_date, "2020");
    }

    #[test]
    fn test_single_object_section() {
        let record = merged(json!({"projects": {"name": "folio", "url": "https://x.dev"}}));
        assert_eq!(record.projects.len(), 1);
        assert_eq!(record.projects[0].project_name, "folio");
        assert_eq!(record.projects[0].project_website, "https://x.dev");
    }

    #[test]
    fn test_categorized_skills() {
        let record = merged(json!({"skills": {"languages": ["Rust", "Go"], "cloud": ["AWS"]}}));
        let names: Vec<_> = record
            .skills
            .iter()
            .map(|s| (s.skill_keyword.as_str(), s.skill_name.as_str()))
            .collect();
        assert_eq!(names, vec![("cloud", "AWS"), ("languages", "Rust"), ("languages", "Go")]);
    }

    #[test]
    fn test_skill_level_is_parsed_and_clamped() {
        let record = merged(json!({"skills": [
            {"name": "Rust", "level": 5},
            {"name": "Go", "level": "4"},
            {"name": "C", "level": 9},
            {"name": "Zig", "proficiency": "Expert"}
        ]}));
        let levels: Vec<_> = record.skills.iter().map(|s| s.skill_level).collect();
        assert_eq!(levels, vec![5, 4, 5, 3]);
    }

    #[test]
    fn test_empty_sections_do_not_overwrite() {
        let mut record = ResumeRecord::new();
        record.skills[0].skill_name = "Rust".to_string();
        record.merge_patch(normalize(&json!({
            "skills": [],
            "experience": "",
            "education": {},
            "projects": [null, 3, ""]
        })));
        assert_eq!(record.skills[0].skill_name, "Rust");
        assert_eq!(record.experience, ResumeRecord::new().experience);
    }

    #[test]
    fn test_certifications_alias() {
        let record = merged(json!({"certifications": ["AWS Solutions Architect"]}));
        assert_eq!(record.certificates[0].cert_name, "AWS Solutions Architect");
    }

    #[test]
    fn test_contact_from_profile() {
        let record = merged(json!({"profile": {
            "name": "Ada Lovelace",
            "role": "Senior Backend Engineer",
            "email": "ada@example.com",
            "phone": "0123456789",
            "location": "London",
            "years": "5"
        }}));
        assert_eq!(record.full_name, "Ada Lovelace");
        assert_eq!(record.headline, "Senior Backend Engineer");
        assert_eq!(record.email, "ada@example.com");
        assert_eq!(record.phone, "0123456789");
        assert_eq!(record.location, "London");
        assert_eq!(record.profile, ResumeRecord::new().profile);
    }

    #[test]
    fn test_contact_from_flat_root() {
        let record = merged(json!({
            "name": "Ada Lovelace",
            "title": "Senior Backend Engineer",
            "contact": {"email": "ada@example.com", "github": "https://github.com/ada"}
        }));
        assert_eq!(record.full_name, "Ada Lovelace");
        assert_eq!(record.headline, "Senior Backend Engineer");
        assert_eq!(record.email, "ada@example.com");
        assert_eq!(record.profile[0].profile_username, "ada");
    }

    #[test]
    fn test_nested_contact_beats_root() {
        let record = merged(json!({
            "name": "Root Name",
            "profile": {"name": "Profile Name"}
        }));
        assert_eq!(record.full_name, "Profile Name");
    }

    #[test]
    fn test_empty_section_falls_through_to_alias() {
        let record = merged(json!({
            "experience": [],
            "work_experience": [{"company": "Acme", "title": "Eng"}]
        }));
        assert_eq!(record.experience.len(), 1);
        assert_eq!(record.experience[0].exp_company, "Acme");
        assert_eq!(record.experience[0].exp_position, "Eng");
    }

    #[test]
    fn test_profile_links_synthesized() {
        let record = merged(json!({"profile": {
            "github": "https://github.com/ada/",
            "contact": {"linkedin": "https://linkedin.com/in/ada-l"}
        }}));
        assert_eq!(
            record.profile,
            vec![
                ProfileLink {
                    profile_network: "GitHub".to_string(),
                    profile_username: "ada".to_string(),
                    profile_website: "https://github.com/ada/".to_string(),
                    profile_icon: "github".to_string(),
                },
                ProfileLink {
                    profile_network: "LinkedIn".to_string(),
                    profile_username: "ada-l".to_string(),
                    profile_website: "https://linkedin.com/in/ada-l".to_string(),
                    profile_icon: "linkedin".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_blank_contact_values_are_ignored() {
        let mut record = ResumeRecord::new();
        record.email = "kept@example.com".to_string();
        record.merge_patch(normalize(&json!({"profile": {"email": "", "role": ""}})));
        assert_eq!(record.email, "kept@example.com");
    }

    #[test]
    fn test_summary_object_form() {
        let record = merged(json!({"summary": {"content": "Builder of things"}}));
        assert_eq!(record.summary, "Builder of things");
    }

    #[test]
    fn test_non_object_payload_is_empty_patch() {
        assert!(normalize(&json!("just text")).is_empty());
        assert!(normalize(&Value::Null).is_empty());
    }

    #[test]
    fn test_entry_form_decode() {
        assert_eq!(EntryForm::decode(&json!("x")), Some(EntryForm::Text("x")));
        assert_eq!(EntryForm::decode(&json!("  ")), None);
        assert_eq!(EntryForm::decode(&json!(42)), None);
        assert!(matches!(
            EntryForm::decode(&json!({"a": 1})),
            Some(EntryForm::Fields(_))
        ));
    }
}
