use crate::utils::error::{RegistryError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RegistryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RegistryError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RegistryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RegistryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_one_of<T: PartialEq + std::fmt::Display>(
    field_name: &str,
    value: T,
    allowed: &[T],
) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let allowed_list: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
    Err(RegistryError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: format!("Allowed values: {}", allowed_list.join(", ")),
    })
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| RegistryError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RegistryError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("repository.endpoint", "https://example.com").is_ok());
        assert!(validate_url("repository.endpoint", "http://localhost:1337").is_ok());
        assert!(validate_url("repository.endpoint", "").is_err());
        assert!(validate_url("repository.endpoint", "invalid-url").is_err());
        assert!(validate_url("repository.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("page_size", 20u32, &[5, 10, 20]).is_ok());
        let err = validate_one_of("page_size", 7u32, &[5, 10, 20]).unwrap_err();
        assert!(err.to_string().contains("5, 10, 20"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("origin.lat", 52.5, -90.0, 90.0).is_ok());
        assert!(validate_range("origin.lat", 91.0, -90.0, 90.0).is_err());
    }

    #[test]
    fn test_validate_required_and_non_empty() {
        let missing: Option<String> = None;
        assert!(validate_required_field("api_token", &missing).is_err());
        assert!(validate_non_empty_string("api_token", "  ").is_err());
        assert!(validate_non_empty_string("api_token", "abc").is_ok());
    }
}
