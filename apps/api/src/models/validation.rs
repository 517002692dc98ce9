//! Inline form validation for the editor.
//!
//! Messages are advisory: the edit is applied either way and the message is
//! shown next to the field.

use crate::models::resume::Section;

/// Returns the inline error for `field`, or `None` when the value is acceptable.
///
/// `section = None` addresses the contact fields.
pub fn validate_field(section: Option<Section>, field: &str, value: &str) -> Option<String> {
    let blank = value.trim().is_empty();

    let message = match (section, field) {
        (None, "fullName") if blank => "Full name is required.",
        (None, "email") if blank => "Email is required.",
        (None, "email") if !is_email(value) => "Enter a valid email.",
        (None, "phone") if blank => "Phone is required.",
        (None, "phone") if !is_phone(value) => "Phone must be 10 digits.",

        (Some(Section::Experience), "expCompany") if blank => "Company name is required.",
        (Some(Section::Experience), "expPosition") if blank => "Position is required.",
        (Some(Section::Experience), "expDate") if blank => "Date is required.",
        (Some(Section::Experience), "expLocation") if blank => "Location is required.",

        (Some(Section::Education), "eduInstitute") if blank => "Institute name is required.",
        (Some(Section::Education), "eduType") if blank => "Education type is required.",
        (Some(Section::Education), "eduScore") if blank => "Score is required.",
        (Some(Section::Education), "eduDate") if blank => "Date is required.",

        _ => return None,
    };

    Some(message.to_string())
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn is_phone(value: &str) -> bool {
    value.len() == 10 && value.chars().all(|c| c.is_ascii_digit())
}
