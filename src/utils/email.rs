use crate::utils::helpers::{RESET_TOKEN_EXPIRATION_MINUTES, escape_html};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;

/// SMTP relay settings plus the client origin used in emailed links
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub client_url: String,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            smtp_host: env::var("SMTP_HOST").map_err(|_| "SMTP_HOST is required")?,
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "465".to_string())
                .parse()
                .map_err(|_| "SMTP_PORT must be a valid number")?,
            smtp_username: env::var("SMTP_USERNAME").map_err(|_| "SMTP_USERNAME is required")?,
            smtp_password: env::var("SMTP_PASSWORD").map_err(|_| "SMTP_PASSWORD is required")?,
            from_email: env::var("SMTP_FROM_EMAIL").map_err(|_| "SMTP_FROM_EMAIL is required")?,
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Writeora".to_string()),
            client_url: env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password/{}",
            self.client_url.trim_end_matches('/'),
            token
        )
    }
}

/// Sends transactional mail through the configured SMTP relay
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new() -> Result<Self, String> {
        let config = EmailConfig::from_env()?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        // Implicit TLS relay; the port decides SMTPS vs submission.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        Ok(transport)
    }

    fn build_message(
        &self,
        to_email: &str,
        subject: &str,
        content_type: ContentType,
        body: String,
    ) -> Result<Message, String> {
        let from_address = format!("{} <{}>", self.config.from_name, self.config.from_email);

        Message::builder()
            .from(
                from_address
                    .parse()
                    .map_err(|e| format!("Invalid from address: {}", e))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| format!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(content_type)
            .body(body)
            .map_err(|e| format!("Failed to build email: {}", e))
    }

    pub async fn send_html_email(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), String> {
        let email =
            self.build_message(to_email, subject, ContentType::TEXT_HTML, html_body.to_string())?;

        let transport = self.build_transport()?;

        transport
            .send(email)
            .await
            .map_err(|e| format!("Failed to send email: {}", e))?;

        Ok(())
    }

    /// Mail the reset link carrying the unhashed token
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        name: &str,
        reset_token: &str,
    ) -> Result<(), String> {
        let subject = "Reset your Writeora password";
        let body = password_reset_body(name, &self.config.reset_link(reset_token));

        self.send_html_email(to_email, subject, &body).await
    }
}

fn password_reset_body(name: &str, link: &str) -> String {
    format!(
        "<p>Hi {name},</p>\
        <p>You requested a password reset. Follow the link below to choose a new password:</p>\
        <p><a href=\"{link}\">{link}</a></p>\
        <p>This link expires in {minutes} minutes. If you didn't request this, you can ignore this email.</p>",
        name = escape_html(name),
        link = escape_html(link),
        minutes = RESET_TOKEN_EXPIRATION_MINUTES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(client_url: &str) -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Writeora".to_string(),
            client_url: client_url.to_string(),
        }
    }

    #[test]
    fn reset_link_points_at_client() {
        assert_eq!(
            config("https://writeora.app/").reset_link("abc123"),
            "https://writeora.app/reset-password/abc123"
        );
    }

    #[test]
    fn reset_body_contains_link_and_expiry() {
        let body = password_reset_body("Ada", "http://localhost:5173/reset-password/t0k3n");
        assert!(body.contains("Hi Ada"));
        assert!(body.contains("href=\"http://localhost:5173/reset-password/t0k3n\""));
        assert!(body.contains("15 minutes"));
    }

    #[test]
    fn reset_body_escapes_user_supplied_name() {
        let body = password_reset_body(
            "<a href=\"https://evil.example\">Ada</a>",
            "http://localhost:5173/reset-password/t0k3n",
        );
        assert!(!body.contains("evil.example\">"));
        assert!(body.contains("Hi &lt;a href=&quot;https://evil.example&quot;&gt;Ada&lt;/a&gt;,"));
        assert!(body.contains("href=\"http://localhost:5173/reset-password/t0k3n\""));
    }

    #[test]
    fn message_rejects_bad_recipient() {
        let service = EmailService::with_config(config("http://localhost:5173"));
        let result = service.build_message(
            "not an address",
            "Subject",
            ContentType::TEXT_HTML,
            String::new(),
        );
        assert!(result.is_err());
    }
}
