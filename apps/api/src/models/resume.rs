//! The canonical in-memory résumé edited by a session.
//!
//! Field names serialize to the editor's camelCase keys (`expCompany`,
//! `skillLevel`, ...) so the record round-trips with the browser form as-is.
//!
//! INVARIANT: every collection holds at least one entry. Removing the last
//! entry blanks it instead of leaving the collection empty.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Default proficiency for skills and languages.
pub const DEFAULT_LEVEL: i64 = 3;

fn default_level() -> i64 {
    DEFAULT_LEVEL
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// A named collection of the résumé.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Profile,
    Experience,
    Education,
    Skills,
    Languages,
    Awards,
    Certificates,
    Interests,
    Projects,
    Publications,
    Volunteering,
    References,
}

impl Section {
    pub const ALL: [Section; 12] = [
        Section::Profile,
        Section::Experience,
        Section::Education,
        Section::Skills,
        Section::Languages,
        Section::Awards,
        Section::Certificates,
        Section::Interests,
        Section::Projects,
        Section::Publications,
        Section::Volunteering,
        Section::References,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Profile => "profile",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Skills => "skills",
            Section::Languages => "languages",
            Section::Awards => "awards",
            Section::Certificates => "certificates",
            Section::Interests => "interests",
            Section::Projects => "projects",
            Section::Publications => "publications",
            Section::Volunteering => "volunteering",
            Section::References => "references",
        }
    }

    /// Case-insensitive lookup by collection key ("Experience" and "experience" both match).
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == key)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry types
// ────────────────────────────────────────────────────────────────────────────

/// Behaviour shared by every collection entry type.
pub trait SectionEntry: Serialize + DeserializeOwned + Default + Clone {
    /// Fields that must be filled on the last entry before another can be added.
    const REQUIRED: &'static [&'static str] = &[];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileLink {
    pub profile_network: String,
    pub profile_username: String,
    pub profile_website: String,
    pub profile_icon: String,
}

impl SectionEntry for ProfileLink {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub exp_company: String,
    pub exp_position: String,
    pub exp_date: String,
    pub exp_location: String,
    pub exp_summary: String,
}

impl SectionEntry for ExperienceEntry {
    const REQUIRED: &'static [&'static str] =
        &["expCompany", "expPosition", "expDate", "expLocation"];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub edu_institute: String,
    pub edu_type: String,
    pub edu_area: String,
    pub edu_score: String,
    pub edu_date: String,
    pub edu_website: String,
    pub edu_summary: String,
}

impl SectionEntry for EducationEntry {
    const REQUIRED: &'static [&'static str] = &["eduInstitute", "eduType", "eduScore", "eduDate"];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    pub skill_name: String,
    pub skill_description: String,
    pub skill_keyword: String,
    pub skill_level: i64,
}

impl Default for SkillEntry {
    fn default() -> Self {
        Self {
            skill_name: String::new(),
            skill_description: String::new(),
            skill_keyword: String::new(),
            skill_level: default_level(),
        }
    }
}

impl SectionEntry for SkillEntry {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub lang_name: String,
    pub lang_description: String,
    pub lang_level: i64,
}

impl Default for LanguageEntry {
    fn default() -> Self {
        Self {
            lang_name: String::new(),
            lang_description: String::new(),
            lang_level: default_level(),
        }
    }
}

impl SectionEntry for LanguageEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AwardEntry {
    pub award_title: String,
    pub award_name: String,
    pub award_date: String,
    pub award_website: String,
    pub award_summary: String,
}

impl SectionEntry for AwardEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateEntry {
    pub cert_name: String,
    pub cert_issuer: String,
    pub cert_date: String,
    pub cert_website: String,
    pub cert_summary: String,
}

impl SectionEntry for CertificateEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InterestEntry {
    pub interest_name: String,
    pub interest_keyword: String,
}

impl SectionEntry for InterestEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub project_name: String,
    pub project_description: String,
    pub project_date: String,
    pub project_website: String,
    pub project_summary: String,
    pub project_keyword: String,
}

impl SectionEntry for ProjectEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationEntry {
    pub publication_name: String,
    pub publication_publisher: String,
    pub publication_date: String,
    pub publication_website: String,
    pub publication_summary: String,
}

impl SectionEntry for PublicationEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteeringEntry {
    pub vol_org: String,
    pub vol_position: String,
    pub vol_date: String,
    pub vol_location: String,
    pub vol_website: String,
    pub vol_summary: String,
}

impl SectionEntry for VolunteeringEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceEntry {
    pub ref_name: String,
    pub ref_description: String,
    pub ref_summary: String,
}

impl SectionEntry for ReferenceEntry {}

// ────────────────────────────────────────────────────────────────────────────
// Record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub full_name: String,
    pub headline: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub summary: String,
    pub picture_url: String,

    pub profile: Vec<ProfileLink>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub languages: Vec<LanguageEntry>,
    pub awards: Vec<AwardEntry>,
    pub certificates: Vec<CertificateEntry>,
    pub interests: Vec<InterestEntry>,
    pub projects: Vec<ProjectEntry>,
    pub publications: Vec<PublicationEntry>,
    pub volunteering: Vec<VolunteeringEntry>,
    pub references: Vec<ReferenceEntry>,
}

impl Default for ResumeRecord {
    /// A blank record: empty scalars and one blank entry per collection.
    fn default() -> Self {
        Self {
            full_name: String::new(),
            headline: String::new(),
            email: String::new(),
            phone: String::new(),
            location: String::new(),
            website: String::new(),
            summary: String::new(),
            picture_url: String::new(),
            profile: vec![ProfileLink::default()],
            experience: vec![ExperienceEntry::default()],
            education: vec![EducationEntry::default()],
            skills: vec![SkillEntry::default()],
            languages: vec![LanguageEntry::default()],
            awards: vec![AwardEntry::default()],
            certificates: vec![CertificateEntry::default()],
            interests: vec![InterestEntry::default()],
            projects: vec![ProjectEntry::default()],
            publications: vec![PublicationEntry::default()],
            volunteering: vec![VolunteeringEntry::default()],
            references: vec![ReferenceEntry::default()],
        }
    }
}

/// Runs `$body` with `$entries` bound to the collection for `$section`.
macro_rules! with_entries {
    ($record:expr, $section:expr, $entries:ident => $body:expr) => {
        match $section {
            Section::Profile => {
                let $entries = &mut $record.profile;
                $body
            }
            Section::Experience => {
                let $entries = &mut $record.experience;
                $body
            }
            Section::Education => {
                let $entries = &mut $record.education;
                $body
            }
            Section::Skills => {
                let $entries = &mut $record.skills;
                $body
            }
            Section::Languages => {
                let $entries = &mut $record.languages;
                $body
            }
            Section::Awards => {
                let $entries = &mut $record.awards;
                $body
            }
            Section::Certificates => {
                let $entries = &mut $record.certificates;
                $body
            }
            Section::Interests => {
                let $entries = &mut $record.interests;
                $body
            }
            Section::Projects => {
                let $entries = &mut $record.projects;
                $body
            }
            Section::Publications => {
                let $entries = &mut $record.publications;
                $body
            }
            Section::Volunteering => {
                let $entries = &mut $record.volunteering;
                $body
            }
            Section::References => {
                let $entries = &mut $record.references;
                $body
            }
        }
    };
}

/// One direct edit from the form: a scalar field when `section` is `None`,
/// otherwise field `field` of entry `index` in `section`.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEdit {
    pub section: Option<Section>,
    #[serde(default)]
    pub index: usize,
    pub field: String,
    pub value: Value,
}

impl ResumeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held by `section`.
    #[cfg(test)]
    pub fn entry_count(&mut self, section: Section) -> usize {
        with_entries!(self, section, entries => entries.len())
    }

    /// Appends a blank entry to `section`.
    ///
    /// Experience and education refuse to grow while the last entry still has
    /// an unfilled required field.
    pub fn add_entry(&mut self, section: Section) -> Result<(), AppError> {
        with_entries!(self, section, entries => push_blank(entries))
    }

    /// Removes entry `index`; the last remaining entry is blanked instead.
    pub fn remove_entry(&mut self, section: Section, index: usize) -> Result<(), AppError> {
        with_entries!(self, section, entries => remove_or_blank(entries, section, index))
    }

    /// Applies one form edit.
    pub fn apply_edit(&mut self, edit: &FieldEdit) -> Result<(), AppError> {
        match edit.section {
            None => {
                let slot = self.scalar_mut(&edit.field).ok_or_else(|| {
                    AppError::Validation(format!("Unknown field '{}'", edit.field))
                })?;
                *slot = value_to_text(&edit.value);
                Ok(())
            }
            Some(section) => with_entries!(self, section, entries => {
                edit_entry(entries, section, edit.index, &edit.field, &edit.value)
            }),
        }
    }

    fn scalar_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "fullName" => Some(&mut self.full_name),
            "headline" => Some(&mut self.headline),
            "email" => Some(&mut self.email),
            "phone" => Some(&mut self.phone),
            "location" => Some(&mut self.location),
            "website" => Some(&mut self.website),
            "summary" => Some(&mut self.summary),
            "pictureUrl" => Some(&mut self.picture_url),
            _ => None,
        }
    }

    /// Overwrites only what `patch` carries; absent parts stay as they are.
    pub fn merge_patch(&mut self, patch: ResumePatch) {
        let ResumePatch {
            full_name,
            headline,
            email,
            phone,
            location,
            website,
            summary,
            profile,
            experience,
            education,
            skills,
            languages,
            awards,
            certificates,
            interests,
            projects,
            publications,
            volunteering,
            references,
        } = patch;

        merge_scalar(&mut self.full_name, full_name);
        merge_scalar(&mut self.headline, headline);
        merge_scalar(&mut self.email, email);
        merge_scalar(&mut self.phone, phone);
        merge_scalar(&mut self.location, location);
        merge_scalar(&mut self.website, website);
        merge_scalar(&mut self.summary, summary);

        merge_entries(&mut self.profile, profile);
        merge_entries(&mut self.experience, experience);
        merge_entries(&mut self.education, education);
        merge_entries(&mut self.skills, skills);
        merge_entries(&mut self.languages, languages);
        merge_entries(&mut self.awards, awards);
        merge_entries(&mut self.certificates, certificates);
        merge_entries(&mut self.interests, interests);
        merge_entries(&mut self.projects, projects);
        merge_entries(&mut self.publications, publications);
        merge_entries(&mut self.volunteering, volunteering);
        merge_entries(&mut self.references, references);
    }
}

/// A partial résumé produced by the normalizer. `None` means "leave alone".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePatch {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,

    pub profile: Option<Vec<ProfileLink>>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub education: Option<Vec<EducationEntry>>,
    pub skills: Option<Vec<SkillEntry>>,
    pub languages: Option<Vec<LanguageEntry>>,
    pub awards: Option<Vec<AwardEntry>>,
    pub certificates: Option<Vec<CertificateEntry>>,
    pub interests: Option<Vec<InterestEntry>>,
    pub projects: Option<Vec<ProjectEntry>>,
    pub publications: Option<Vec<PublicationEntry>>,
    pub volunteering: Option<Vec<VolunteeringEntry>>,
    pub references: Option<Vec<ReferenceEntry>>,
}

impl ResumePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn merge_scalar(slot: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *slot = value;
    }
}

fn merge_entries<T>(slot: &mut Vec<T>, value: Option<Vec<T>>) {
    if let Some(entries) = value.filter(|e| !e.is_empty()) {
        *slot = entries;
    }
}

fn push_blank<T: SectionEntry>(entries: &mut Vec<T>) -> Result<(), AppError> {
    if let Some(last) = entries.last() {
        let fields = to_object(last)?;
        for &required in T::REQUIRED {
            let filled = fields
                .get(required)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !filled {
                return Err(AppError::Validation(format!(
                    "Please fill required field: {required}"
                )));
            }
        }
    }
    entries.push(T::default());
    Ok(())
}

fn remove_or_blank<T: SectionEntry>(
    entries: &mut Vec<T>,
    section: Section,
    index: usize,
) -> Result<(), AppError> {
    if index >= entries.len() {
        return Err(AppError::Validation(format!(
            "{section} has no entry at index {index}"
        )));
    }
    if entries.len() == 1 {
        entries[0] = T::default();
    } else {
        entries.remove(index);
    }
    Ok(())
}

fn edit_entry<T: SectionEntry>(
    entries: &mut [T],
    section: Section,
    index: usize,
    field: &str,
    value: &Value,
) -> Result<(), AppError> {
    let entry = entries.get_mut(index).ok_or_else(|| {
        AppError::Validation(format!("{section} has no entry at index {index}"))
    })?;

    let mut fields = to_object(entry)?;
    let slot = fields.get_mut(field).ok_or_else(|| {
        AppError::Validation(format!("Unknown field '{field}' in {section}"))
    })?;
    *slot = coerce_like(slot, value).ok_or_else(|| {
        AppError::Validation(format!("Field '{field}' expects a whole number"))
    })?;

    *entry = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("entry rebuild failed: {e}")))?;
    Ok(())
}

fn to_object<T: Serialize>(entry: &T) -> Result<serde_json::Map<String, Value>, AppError> {
    match serde_json::to_value(entry) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!(
            "entry did not serialize to an object"
        ))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

/// Converts `value` to the JSON type currently held by `current`.
fn coerce_like(current: &Value, value: &Value) -> Option<Value> {
    if current.is_number() {
        match value {
            Value::Number(n) => n.as_i64().map(Value::from),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        }
    } else {
        Some(Value::String(value_to_text(value)))
    }
}

/// Renders a JSON value as form text: strings verbatim, null as empty.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edit(section: Option<Section>, index: usize, field: &str, value: Value) -> FieldEdit {
        FieldEdit {
            section,
            index,
            field: field.to_string(),
            value,
        }
    }

    #[test]
    fn test_default_record_has_one_blank_entry_per_section() {
        let mut record = ResumeRecord::new();
        for section in Section::ALL {
            assert_eq!(record.entry_count(section), 1, "{section}");
        }
        assert_eq!(record.skills[0].skill_level, DEFAULT_LEVEL);
        assert_eq!(record.languages[0].lang_level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_serializes_editor_keys() {
        let record = ResumeRecord::new();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["fullName"], "");
        assert_eq!(value["skills"][0]["skillLevel"], 3);
        assert_eq!(value["experience"][0]["expCompany"], "");
        assert_eq!(value["volunteering"][0]["volOrg"], "");
    }

    #[test]
    fn test_section_from_key_is_case_insensitive() {
        assert_eq!(Section::from_key("Experience"), Some(Section::Experience));
        assert_eq!(Section::from_key(" skills "), Some(Section::Skills));
        assert_eq!(Section::from_key("hobbies"), None);
    }

    #[test]
    fn test_remove_last_entry_blanks_it() {
        let mut record = ResumeRecord::new();
        record.skills[0].skill_name = "Rust".to_string();
        record.skills[0].skill_level = 5;

        record.remove_entry(Section::Skills, 0).unwrap();

        assert_eq!(record.skills, vec![SkillEntry::default()]);
        assert_eq!(record.skills[0].skill_level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_remove_entry_with_siblings_deletes_it() {
        let mut record = ResumeRecord::new();
        record.interests[0].interest_name = "Chess".to_string();
        record.add_entry(Section::Interests).unwrap();
        record.interests[1].interest_name = "Climbing".to_string();

        record.remove_entry(Section::Interests, 0).unwrap();

        assert_eq!(record.interests.len(), 1);
        assert_eq!(record.interests[0].interest_name, "Climbing");
    }

    #[test]
    fn test_remove_entry_out_of_range() {
        let mut record = ResumeRecord::new();
        let err = record.remove_entry(Section::Awards, 3).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(record.awards.len(), 1);
    }

    #[test]
    fn test_add_experience_requires_filled_last_entry() {
        let mut record = ResumeRecord::new();
        record.experience[0].exp_company = "Acme".to_string();

        let err = record.add_entry(Section::Experience).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Please fill required field: expPosition"
        );
        assert_eq!(record.experience.len(), 1);

        record.experience[0].exp_position = "Engineer".to_string();
        record.experience[0].exp_date = "2020 - 2024".to_string();
        record.experience[0].exp_location = "Berlin".to_string();
        record.add_entry(Section::Experience).unwrap();
        assert_eq!(record.experience.len(), 2);
    }

    #[test]
    fn test_add_skill_has_no_required_fields() {
        let mut record = ResumeRecord::new();
        record.add_entry(Section::Skills).unwrap();
        assert_eq!(record.skills.len(), 2);
        assert_eq!(record.skills[1].skill_level, DEFAULT_LEVEL);
    }

    #[test]
    fn test_apply_scalar_edit() {
        let mut record = ResumeRecord::new();
        record
            .apply_edit(&edit(None, 0, "fullName", json!("Ada Lovelace")))
            .unwrap();
        assert_eq!(record.full_name, "Ada Lovelace");

        let err = record
            .apply_edit(&edit(None, 0, "nickname", json!("Ada")))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_apply_entry_edit_coerces_level() {
        let mut record = ResumeRecord::new();
        record
            .apply_edit(&edit(Some(Section::Skills), 0, "skillLevel", json!("4")))
            .unwrap();
        assert_eq!(record.skills[0].skill_level, 4);

        let err = record
            .apply_edit(&edit(Some(Section::Skills), 0, "skillLevel", json!("high")))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(record.skills[0].skill_level, 4);
    }

    #[test]
    fn test_apply_entry_edit_rejects_unknown_field_and_index() {
        let mut record = ResumeRecord::new();
        assert!(record
            .apply_edit(&edit(Some(Section::Education), 0, "eduColor", json!("x")))
            .is_err());
        assert!(record
            .apply_edit(&edit(Some(Section::Education), 2, "eduType", json!("BSc")))
            .is_err());
        record
            .apply_edit(&edit(Some(Section::Education), 0, "eduType", json!("BSc")))
            .unwrap();
        assert_eq!(record.education[0].edu_type, "BSc");
    }

    #[test]
    fn test_merge_patch_leaves_absent_sections_untouched() {
        let mut record = ResumeRecord::new();
        record.experience[0].exp_company = "Acme".to_string();
        let before = record.clone();

        record.merge_patch(ResumePatch {
            summary: Some("X".to_string()),
            skills: Some(vec![]),
            ..Default::default()
        });

        assert_eq!(record.summary, "X");
        assert_eq!(record.experience, before.experience);
        assert_eq!(record.skills, before.skills);
    }

    #[test]
    fn test_merge_patch_ignores_blank_scalars() {
        let mut record = ResumeRecord::new();
        record.email = "ada@example.com".to_string();
        record.merge_patch(ResumePatch {
            email: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(record.email, "ada@example.com");
    }
}
