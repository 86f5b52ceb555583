use std::env;

/// SMTP settings for outbound mail.
///
/// Delivery is disabled unless `SMTP_ENABLED` is set; the defaults point at a
/// local capture server (Mailpit/MailHog on 1025) for development.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let enabled = matches!(
            env::var("SMTP_ENABLED").as_deref(),
            Ok("true") | Ok("TRUE") | Ok("True") | Ok("1")
        );

        Self {
            enabled,
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1025),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@slateworks.io".to_string()),
            from_name: env::var("FROM_NAME").unwrap_or_else(|_| "Slateworks".to_string()),
        }
    }
}
