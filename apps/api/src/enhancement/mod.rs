//! Section enhancement: rewrites one résumé section's content through the LLM,
//! constrained to the field layout of that section.

pub mod handlers;
pub mod prompts;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;

// ────────────────────────────────────────────────────────────────────────────
// Output schemas
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub description: &'static str,
}

const fn text(name: &'static str, description: &'static str) -> SchemaField {
    SchemaField {
        name,
        field_type: FieldType::Text,
        required: true,
        description,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhanceSchema {
    pub key: &'static str,
    pub fields: &'static [SchemaField],
}

pub const TEXT_SCHEMA: EnhanceSchema = EnhanceSchema {
    key: "text",
    fields: &[text("content", "The enhanced text content")],
};

const SCHEMAS: &[EnhanceSchema] = &[
    EnhanceSchema {
        key: "experience",
        fields: &[
            text("expCompany", "Company Name"),
            text("expPosition", "Job Title"),
            text("expDate", "Dates (e.g., 'Jan 2020 - Present')"),
            text("expLocation", "City, Country"),
            text("expSummary", "Professional summary (no bullet points)."),
        ],
    },
    EnhanceSchema {
        key: "education",
        fields: &[
            text("eduInstitute", "University Name"),
            text("eduType", "Degree type"),
            text("eduScore", "GPA/Score"),
            text("eduDate", "Graduation Year"),
            text("eduSummary", "Description"),
        ],
    },
    EnhanceSchema {
        key: "skills",
        fields: &[
            text("skillName", ""),
            text("skillDescription", ""),
            text("skillKeyword", ""),
            SchemaField {
                name: "skillLevel",
                field_type: FieldType::Number,
                required: true,
                description: "1-5",
            },
        ],
    },
    EnhanceSchema {
        key: "projects",
        fields: &[
            text("projectName", ""),
            text("projectDescription", ""),
            SchemaField {
                name: "projectWebsite",
                field_type: FieldType::Text,
                required: false,
                description: "",
            },
            text("projectSummary", ""),
        ],
    },
    EnhanceSchema {
        key: "summary",
        fields: TEXT_SCHEMA.fields,
    },
    EnhanceSchema {
        key: "awards",
        fields: &[
            text("awardTitle", "Name of the award"),
            text("awardDate", "Date received"),
            text("awardSummary", "Description of the achievement"),
        ],
    },
    EnhanceSchema {
        key: "publications",
        fields: &[
            text("publicationName", "Title of publication"),
            text("publicationPublisher", "Publisher/Journal"),
            text("publicationDate", "Date"),
            text("publicationSummary", "Summary of the work"),
        ],
    },
    EnhanceSchema {
        key: "volunteering",
        fields: &[
            text("volOrg", "Organization"),
            text("volPosition", "Role/Position"),
            text("volDate", "Dates"),
            text("volLocation", "Location"),
            text("volSummary", "Description of service"),
        ],
    },
    EnhanceSchema {
        key: "interests",
        fields: &[text("interestName", "Name of interest or hobby")],
    },
];

/// Schema for a section key (case-insensitive). Unknown sections get [`TEXT_SCHEMA`].
pub fn schema_for(section: &str) -> &'static EnhanceSchema {
    let key = section.trim().to_lowercase();
    SCHEMAS
        .iter()
        .find(|s| s.key == key)
        .unwrap_or(&TEXT_SCHEMA)
}

impl EnhanceSchema {
    /// One line per field, as listed in the prompt.
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                let ty = match f.field_type {
                    FieldType::Text => "string",
                    FieldType::Number => "number",
                };
                let optional = if f.required { "" } else { ", optional" };
                if f.description.is_empty() {
                    format!("- \"{}\" ({ty}{optional})", f.name)
                } else {
                    format!("- \"{}\" ({ty}{optional}): {}", f.name, f.description)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Checks an LLM result against the schema. Returns the first problem found.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let object = value
            .as_object()
            .ok_or_else(|| "Enhanced content is not a JSON object".to_string())?;

        for field in self.fields {
            match (object.get(field.name), field.field_type) {
                (None | Some(Value::Null), _) if !field.required => {}
                (None | Some(Value::Null), _) => {
                    return Err(format!("Enhanced content is missing field '{}'", field.name))
                }
                (Some(Value::String(_)), FieldType::Text)
                | (Some(Value::Number(_)), FieldType::Number) => {}
                (Some(_), _) => {
                    return Err(format!(
                        "Enhanced content field '{}' has the wrong type",
                        field.name
                    ))
                }
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Enhancement
// ────────────────────────────────────────────────────────────────────────────

/// Rejects content with nothing to enhance.
pub fn validate_input(content: &Value) -> Result<(), AppError> {
    let empty = match content {
        Value::Null => return Err(AppError::Validation("Input is empty!".to_string())),
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return Err(AppError::Validation(
            "Cannot enhance empty content. Please add some details first.".to_string(),
        ));
    }
    Ok(())
}

pub fn build_prompt(schema: &EnhanceSchema, content: &Value) -> Result<String, AppError> {
    let content = serde_json::to_string_pretty(content).map_err(anyhow::Error::from)?;
    Ok(prompts::ENHANCE_PROMPT
        .replace("{fields}", &schema.describe())
        .replace("{content}", &content))
}

/// Rewrites `content` for `section` and returns the schema-shaped result.
pub async fn enhance_section(
    llm: &LlmClient,
    section: &str,
    content: &Value,
) -> Result<Value, AppError> {
    validate_input(content)?;

    let schema = schema_for(section);
    debug!("Enhancing section '{section}' with schema '{}'", schema.key);

    let prompt = build_prompt(schema, content)?;
    let enhanced: Value = llm.call_json(&prompt, prompts::ENHANCE_SYSTEM).await?;

    schema.check(&enhanced).map_err(|problem| {
        warn!("Rejected enhancement for '{section}': {problem}");
        AppError::Llm(problem)
    })?;

    info!("Enhanced section '{section}' via {}", llm.model());
    Ok(enhanced)
}
