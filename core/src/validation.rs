//! Pre-flight validators.
//!
//! Every function is pure and returns `Error::Validation` on failure.
//! Resource methods call them before building a request, so a rejected input
//! never reaches the transport.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::rpc::Params;

#[allow(clippy::expect_used)] // literal patterns
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-_]+$").expect("static regex should not panic"));
#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("static regex should not panic")
});
#[allow(clippy::expect_used)]
static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("static regex should not panic")
});
#[allow(clippy::expect_used)]
static MEMORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(M|G|K)?$").expect("static regex should not panic"));
#[allow(clippy::expect_used)]
static CPU: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d+$").expect("static regex should not panic"));
#[allow(clippy::expect_used)]
static DATABASE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]{0,62}$").expect("static regex should not panic")
});
#[allow(clippy::expect_used)]
static TWO_FACTOR_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("static regex should not panic"));
#[allow(clippy::expect_used)]
static STORAGE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-/.]+$").expect("static regex should not panic"));

fn validate_identifier(value: &str, field: &str, label: &str) -> Result<()> {
    if IDENTIFIER.is_match(value) {
        return Ok(());
    }
    Err(Error::invalid_field(
        field,
        format!("{label} must contain only lowercase letters, numbers, hyphens, and underscores"),
    ))
}

pub fn validate_project_name(name: &str) -> Result<()> {
    validate_identifier(name, "projectName", "Project name")
}

pub fn validate_service_name(name: &str) -> Result<()> {
    validate_identifier(name, "serviceName", "Service name")
}

/// Volume, provider and rule names share the project-name alphabet.
pub fn validate_volume_name(name: &str) -> Result<()> {
    validate_identifier(name, "name", "Volume name")
}

/// Identifier check for an arbitrary field.
pub fn validate_name_field(value: &str, field: &str) -> Result<()> {
    validate_identifier(value, field, field)
}

pub fn validate_required_field(value: Option<&str>, field: &str) -> Result<()> {
    match value {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(Error::invalid_field(
            field,
            format!("Required field '{field}' is missing or empty"),
        )),
    }
}

/// `true` for `null`, `""`, `[]` and `{}`. `false` and `0` count as values.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Checks every field and reports all missing ones in a single error.
pub fn validate_required(params: &Params, fields: &[&str]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| params.get(*field).map_or(true, is_blank))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let errors = missing
        .iter()
        .map(|field| (field.to_string(), vec!["This field is required".to_string()]))
        .collect();
    Err(Error::Validation {
        message: format!("Missing required fields: {}", missing.join(", ")),
        errors,
    })
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.len() <= 254 && EMAIL.is_match(email) {
        return Ok(());
    }
    Err(Error::invalid_field("email", "Invalid email address"))
}

/// Absolute URL with a scheme and a host.
pub fn validate_url(value: &str) -> Result<()> {
    match url::Url::parse(value) {
        Ok(parsed) if parsed.has_host() => Ok(()),
        _ => Err(Error::invalid_field("url", "Invalid URL format")),
    }
}

pub fn validate_port(port: i64) -> Result<()> {
    if (1..=65535).contains(&port) {
        return Ok(());
    }
    Err(Error::invalid_field("port", "Port must be between 1 and 65535"))
}

/// Port carried in a JSON value: must be an integer, then in range.
pub fn validate_port_value(value: &Value, field: &str) -> Result<u16> {
    let Some(port) = value.as_i64() else {
        return Err(Error::invalid_field(
            field,
            format!("{field} must be an integer"),
        ));
    };
    match u16::try_from(port) {
        Ok(port) if port >= 1 => Ok(port),
        _ => Err(Error::invalid_field(
            field,
            format!("{field} must be between 1 and 65535"),
        )),
    }
}

pub fn validate_domain_name(domain: &str) -> Result<()> {
    if DOMAIN.is_match(domain) {
        return Ok(());
    }
    Err(Error::invalid_field("domain", "Invalid domain name format"))
}

pub fn validate_memory_limit(memory: &str) -> Result<()> {
    if MEMORY.is_match(memory) {
        return Ok(());
    }
    Err(Error::invalid_field(
        "memory",
        "Memory limit must be in format like 512M, 1G, etc.",
    ))
}

pub fn validate_cpu_limit(cpu: &str) -> Result<()> {
    if CPU.is_match(cpu) {
        return Ok(());
    }
    Err(Error::invalid_field(
        "cpu",
        "CPU limit must be a valid decimal number",
    ))
}

pub fn validate_schedule(schedule: &str) -> Result<()> {
    if schedule.trim().is_empty() {
        return Err(Error::invalid_field("schedule", "Schedule cannot be empty"));
    }
    Ok(())
}

pub fn validate_database_name(name: &str) -> Result<()> {
    if DATABASE_NAME.is_match(name) {
        return Ok(());
    }
    Err(Error::invalid_field(
        "databaseName",
        "Database name must start with a letter and contain only letters, numbers, underscores, and hyphens (max 63 characters)",
    ))
}

pub fn validate_two_factor_code(code: &str) -> Result<()> {
    if TWO_FACTOR_CODE.is_match(code) {
        return Ok(());
    }
    Err(Error::invalid_field("code", "Two-factor code must be 6 digits"))
}

pub fn validate_storage_path(path: &str, field: &str) -> Result<()> {
    if STORAGE_PATH.is_match(path) {
        return Ok(());
    }
    Err(Error::invalid_field(
        field,
        format!("{field} contains invalid characters"),
    ))
}

pub fn validate_absolute_path(path: &str, field: &str) -> Result<()> {
    if path.starts_with('/') {
        return Ok(());
    }
    Err(Error::invalid_field(
        field,
        format!("{field} must be an absolute path"),
    ))
}

pub fn validate_one_of(value: &str, allowed: &[&str], field: &str) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(Error::invalid_field(
        field,
        format!("{field} must be one of: {}", allowed.join(", ")),
    ))
}

/// Stages the WordPress profiler can sample.
pub const WORDPRESS_STAGES: [&str; 3] = ["bootstrap", "main_query", "template"];

pub fn validate_wordpress_stage(stage: &str) -> Result<()> {
    if WORDPRESS_STAGES.contains(&stage) {
        return Ok(());
    }
    Err(Error::invalid_field(
        "stage",
        format!("WordPress stage must be one of: {}", WORDPRESS_STAGES.join(", ")),
    ))
}
