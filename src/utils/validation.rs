use crate::utils::error::{PortfolioError, Result};
use lettre::Address;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(PortfolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PortfolioError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PortfolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(PortfolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| PortfolioError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortfolioError::InvalidConfigValueError {
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
        return Err(PortfolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 以郵件函式庫的位址解析為準，通過檢查的位址一定能放進信件標頭
pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    let value = value.trim();
    value
        .parse::<Address>()
        .map(|_| ())
        .map_err(|e| PortfolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value is not a valid email address: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("github.api_base", "https://api.github.com").is_ok());
        assert!(validate_url("github.api_base", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("github.api_base", "").is_err());
        assert!(validate_url("github.api_base", "invalid-url").is_err());
        assert!(validate_url("github.api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("aggregation.display_limit", 4, 1, 10).is_ok());
        assert!(validate_range("aggregation.display_limit", 0, 1, 10).is_err());
        assert!(validate_range("aggregation.display_limit", 11, 1, 10).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", "alice@example.com").is_ok());
        assert!(validate_email("email", "alice").is_err());
        assert!(validate_email("email", "@example.com").is_err());
        assert!(validate_email("email", "alice@").is_err());
        assert!(validate_email("email", "a b@example.com").is_err());
        assert!(validate_email("email", "alice@@example.com").is_err());
        assert!(validate_email("email", " alice@example.com ").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_unsendable_addresses() {
        for address in [
            "bob<x>@example.com",
            "bob,eve@example.com",
            "bob\"@example.com",
            "bob@ex..com",
            "bob@-x.com",
        ] {
            assert!(
                validate_email("email", address).is_err(),
                "accepted {:?}",
                address
            );
        }
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("user".to_string());
        let absent: Option<String> = None;
        assert_eq!(validate_required_field("mail.username", &present).unwrap(), "user");
        assert!(matches!(
            validate_required_field("mail.username", &absent),
            Err(PortfolioError::MissingConfigError { .. })
        ));
    }
}
