use crate::domain::ports::MailCredentials;
use crate::utils::error::{PortfolioError, Result};
use crate::utils::validation::{
    validate_email, validate_non_empty_string, validate_positive_number,
    validate_required_field, Validate,
};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_RELAY_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_RELAY_PORT: u16 = 587;
pub const DEFAULT_SENDER_NAME: &str = "Portfolio Contact Form";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSecurity {
    /// 明文連線後升級 (587)
    #[default]
    Starttls,
    /// 直接 TLS (465)
    Tls,
    None,
}

/// 郵件中繼設定；帳號密碼可缺，缺少時在寄送時回報設定錯誤
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub relay_host: String,
    pub relay_port: u16,
    pub security: TransportSecurity,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub recipient: String,
    pub sender_name: String,
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_host: DEFAULT_RELAY_HOST.to_string(),
            relay_port: DEFAULT_RELAY_PORT,
            security: TransportSecurity::default(),
            username: None,
            password: None,
            recipient: String::new(),
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            timeout_seconds: 10,
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("relay_host", &self.relay_host)
            .field("relay_port", &self.relay_port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("recipient", &self.recipient)
            .field("sender_name", &self.sender_name)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl MailConfig {
    /// 以 EMAIL_USER / EMAIL_PASS / CONTACT_RECIPIENT 補上未設定的欄位
    pub fn with_env_fallback(mut self) -> Self {
        if self.username.is_none() {
            self.username = env_value("EMAIL_USER");
        }
        if self.password.is_none() {
            self.password = env_value("EMAIL_PASS");
        }
        if self.recipient.trim().is_empty() {
            if let Some(recipient) = env_value("CONTACT_RECIPIENT") {
                self.recipient = recipient;
            }
        }
        self
    }

    /// 空字串或未替換的 `${VAR}` 視為未設定
    pub fn normalized(mut self) -> Self {
        self.username = self.username.and_then(present);
        self.password = self.password.and_then(present);
        self.recipient = present(self.recipient).unwrap_or_default();
        self
    }

    pub fn credentials(&self) -> Result<MailCredentials> {
        let username = validate_required_field("mail.username", &self.username)?.clone();
        let password = validate_required_field("mail.password", &self.password)?.clone();
        if self.recipient.trim().is_empty() {
            return Err(PortfolioError::MissingConfigError {
                field: "mail.recipient".to_string(),
            });
        }
        Ok(MailCredentials { username, password })
    }
}

impl Validate for MailConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("mail.relay_host", &self.relay_host)?;
        validate_positive_number("mail.relay_port", self.relay_port as usize, 1)?;
        validate_non_empty_string("mail.sender_name", &self.sender_name)?;
        validate_positive_number("mail.timeout_seconds", self.timeout_seconds as usize, 1)?;
        // 收件人可暫缺，但若有設定必須是合法地址
        if !self.recipient.trim().is_empty() {
            validate_email("mail.recipient", &self.recipient)?;
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().and_then(present)
}

pub(crate) fn present(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || (trimmed.starts_with("${") && trimmed.ends_with('}')) {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let config = MailConfig {
            username: Some("site@example.com".to_string()),
            password: Some("hunter2".to_string()),
            ..MailConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("********"));
    }

    #[test]
    fn test_credentials_require_both_values() {
        let config = MailConfig {
            username: Some("site@example.com".to_string()),
            recipient: "owner@example.com".to_string(),
            ..MailConfig::default()
        };
        assert!(matches!(
            config.credentials(),
            Err(PortfolioError::MissingConfigError { field }) if field == "mail.password"
        ));

        let config = MailConfig {
            password: Some("secret".to_string()),
            ..config
        };
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username, "site@example.com");
    }

    #[test]
    fn test_unresolved_placeholders_are_absent() {
        let config = MailConfig {
            username: Some("${EMAIL_USER}".to_string()),
            password: Some("".to_string()),
            ..MailConfig::default()
        }
        .normalized();
        assert_eq!(config.username, None);
        assert_eq!(config.password, None);
    }

    #[test]
    fn test_validate_recipient_format() {
        let mut config = MailConfig::default();
        assert!(config.validate().is_ok());
        config.recipient = "nobody".to_string();
        assert!(config.validate().is_err());
    }
}
