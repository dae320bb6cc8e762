//! Field rules shared by the request handlers. Each check returns the
//! normalized value or a field-level validation error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*";

const MAX_NAME_LEN: usize = 50;
const MAX_DEPARTMENT_NAME_LEN: usize = 50;
const MAX_COURSE_CODE_LEN: usize = 10;
const MAX_COURSE_NAME_LEN: usize = 255;
const MAX_VERSION_LEN: usize = 10;
const MAX_BIO_LEN: usize = 500;
const MAX_EMAIL_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_CREDIT: i16 = 20;

static MOBILE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+91[6-9]\d{9}$").expect("valid regex"));
static DEPARTMENT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s&]+$").expect("valid regex"));
static COURSE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+-\d+-[Vv\d]+$").expect("valid regex"));
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").expect("valid regex"));

fn required<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::field(field, "This field may not be blank."));
    }
    Ok(value)
}

fn max_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::field(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

/// Capitalizes the first letter of every word and lowercases the rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_letter = false;
    for c in value.chars() {
        if prev_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }
    out
}

pub fn normalize_person_name(field: &str, value: &str) -> AppResult<String> {
    let value = required(field, value)?;
    max_len(field, value, MAX_NAME_LEN)?;
    Ok(title_case(value))
}

pub fn normalize_email(value: &str, blocked_domains: &[String]) -> AppResult<String> {
    let email = required("email", value)?.to_lowercase();
    max_len("email", &email, MAX_EMAIL_LEN)?;

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| AppError::field("email", "Enter a valid email address."))?;
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if !well_formed {
        return Err(AppError::field("email", "Enter a valid email address."));
    }

    if blocked_domains.iter().any(|blocked| blocked == domain) {
        return Err(AppError::field(
            "email",
            format!("Emails from '{domain}' are not permitted."),
        ));
    }

    Ok(email)
}

pub fn validate_password(field: &str, value: &str) -> AppResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::field(
            field,
            format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
        ));
    }

    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));
    if !has_digit || !has_special {
        let subject = if field == "new_password" {
            "New password"
        } else {
            "Password"
        };
        return Err(AppError::field(
            field,
            format!(
                "{subject} must include at least one number and one special character ({PASSWORD_SPECIAL_CHARS})."
            ),
        ));
    }
    Ok(())
}

/// `+91` followed by ten digits, the first of which is 6-9.
pub fn validate_mobile_number(value: &str) -> AppResult<String> {
    let value = value.trim();
    let valid = MOBILE_NUMBER_RE.is_match(value);

    if !valid {
        return Err(AppError::field(
            "mobile_number",
            "Enter a valid Indian mobile number (e.g., +919876543210).",
        ));
    }
    Ok(value.to_string())
}

/// Keeps only `p`, `strong` and `em` markup.
pub fn sanitize_bio(value: &str) -> AppResult<String> {
    max_len("bio", value, MAX_BIO_LEN)?;
    let cleaned = ammonia::Builder::empty()
        .add_tags(&["p", "strong", "em"])
        .clean(value)
        .to_string();
    Ok(cleaned.trim().to_string())
}

pub fn validate_department_name(value: &str) -> AppResult<String> {
    let value = required("name", value)?;
    max_len("name", value, MAX_DEPARTMENT_NAME_LEN)?;
    if !DEPARTMENT_NAME_RE.is_match(value) {
        return Err(AppError::field(
            "name",
            "Name must contain only letters, spaces, or '&'",
        ));
    }
    Ok(value.to_string())
}

/// Letters, a dash, digits, a dash, then a run of `V`/`v`/digits (e.g. `CSE-101-V1`).
pub fn validate_course_code(value: &str) -> AppResult<String> {
    let value = required("course_code", value)?;
    max_len("course_code", value, MAX_COURSE_CODE_LEN)?;

    let valid = COURSE_CODE_RE.is_match(value);

    if !valid {
        return Err(AppError::field(
            "course_code",
            "Course code must be in the format CSE-101-V1.",
        ));
    }
    Ok(value.to_string())
}

pub fn validate_course_name(value: &str) -> AppResult<String> {
    let value = required("course_name", value)?;
    max_len("course_name", value, MAX_COURSE_NAME_LEN)?;
    Ok(value.to_string())
}

pub fn validate_maximum_credit(value: i16) -> AppResult<i16> {
    if !(0..=MAX_CREDIT).contains(&value) {
        return Err(AppError::field(
            "maximum_credit",
            format!("Maximum credit must be between 0 and {MAX_CREDIT}."),
        ));
    }
    Ok(value)
}

pub fn validate_version(value: &str) -> AppResult<String> {
    let value = value.trim();
    let valid = value.chars().count() <= MAX_VERSION_LEN && VERSION_RE.is_match(value);

    if !valid {
        return Err(AppError::field(
            "version",
            "Version must be in format 'X.Y' (e.g., 1.0).",
        ));
    }
    Ok(value.to_string())
}
