//! Share email rendering.

use chrono::DateTime;
use chrono_tz::Tz;

use super::EmailMessage;
use crate::drive::SharePermission;

/// Sender name used when the sharing user has no display name.
pub const DEFAULT_SENDER_NAME: &str = "A user";

/// Notification sent to one recipient of a share.
#[derive(Debug, Clone)]
pub struct ShareEmail {
    pub to: String,
    pub file_name: String,
    pub file_url: String,
    pub sender_name: String,
    /// Share password as entered by the sharer.
    pub password: Option<String>,
    /// Expiry as RFC 3339.
    pub expiry_date: Option<String>,
    pub permission: SharePermission,
}

impl ShareEmail {
    /// Sender name, or [`DEFAULT_SENDER_NAME`] when blank.
    pub fn sender(&self) -> &str {
        let name = self.sender_name.trim();
        if name.is_empty() {
            DEFAULT_SENDER_NAME
        } else {
            name
        }
    }

    pub fn subject(&self) -> String {
        format!("{} shared a file with you: {}", self.sender(), self.file_name)
    }

    /// HTML body; every interpolated value is escaped.
    pub fn html(&self, tz: Tz) -> String {
        let mut details = format!(
            "<p><strong>File name:</strong> {}</p>\n",
            escape_html(&self.file_name)
        );
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            details.push_str(&format!(
                "      <p><strong>Password:</strong> {}</p>\n",
                escape_html(password)
            ));
        }
        if let Some(expiry) = self.expiry_date.as_deref().filter(|e| !e.is_empty()) {
            details.push_str(&format!(
                "      <p><strong>Expires:</strong> {}</p>\n",
                escape_html(&format_expiry(expiry, tz))
            ));
        }
        details.push_str(&format!(
            "      <p><strong>Permissions:</strong> {}</p>",
            self.permission.label()
        ));

        format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">File shared</h2>
  <p>{sender} shared a file with you!</p>
  <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
      {details}
  </div>
  <a href="{url}" style="display: inline-block; background-color: #ac93b9; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;">Open file</a>
  <p style="color: #666; margin-top: 20px; font-size: 0.9em;">This file was shared with you personally. Please handle it with care.</p>
</div>"#,
            sender = escape_html(self.sender()),
            details = details,
            url = escape_html(&self.file_url),
        )
    }

    /// Render into a deliverable message.
    pub fn to_message(&self, tz: Tz) -> EmailMessage {
        EmailMessage {
            to: self.to.clone(),
            subject: self.subject(),
            html: self.html(tz),
        }
    }
}

/// Long-form expiry date in `tz`; unparseable input is shown as-is.
fn format_expiry(value: &str, tz: Tz) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt
            .with_timezone(&tz)
            .format("%A, %-d %B %Y %H:%M %Z")
            .to_string(),
        Err(_) => value.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> ShareEmail {
        ShareEmail {
            to: "bob@example.com".to_string(),
            file_name: "report.pdf".to_string(),
            file_url: "https://baas.example.com/v1/storage/buckets/b/files/x/view?project=p&x=1"
                .to_string(),
            sender_name: "Alice".to_string(),
            password: None,
            expiry_date: None,
            permission: SharePermission::Read,
        }
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            email().subject(),
            "Alice shared a file with you: report.pdf"
        );
    }

    #[test]
    fn test_sender_fallback() {
        let mut email = email();
        email.sender_name = "  ".to_string();
        assert_eq!(email.sender(), DEFAULT_SENDER_NAME);
        assert!(email.subject().starts_with("A user shared"));
    }

    #[test]
    fn test_html_read_only() {
        let html = email().html(Tz::UTC);
        assert!(html.contains("Read only"));
        assert!(!html.contains("Password"));
        assert!(!html.contains("Expires"));
        assert!(html.contains("view?project=p&amp;x=1"));
    }

    #[test]
    fn test_html_with_options() {
        let mut email = email();
        email.permission = SharePermission::Write;
        email.password = Some("s3cret".to_string());
        email.expiry_date = Some("2024-10-05T10:15:00Z".to_string());

        let html = email.html(Tz::Europe__Istanbul);
        assert!(html.contains("Read and write"));
        assert!(html.contains("<strong>Password:</strong> s3cret"));
        assert!(html.contains("Saturday, 5 October 2024 13:15"));
    }

    #[test]
    fn test_html_escapes_values() {
        let mut email = email();
        email.file_name = "<script>alert('x')</script>.txt".to_string();
        email.sender_name = "Tom & Jerry".to_string();

        let html = email.html(Tz::UTC);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;.txt"));
        assert!(html.contains("Tom &amp; Jerry shared a file"));
    }

    #[test]
    fn test_unparseable_expiry_shown_raw() {
        assert_eq!(format_expiry("next week", Tz::UTC), "next week");
    }

    #[test]
    fn test_to_message() {
        let message = email().to_message(Tz::UTC);
        assert_eq!(message.to, "bob@example.com");
        assert_eq!(message.subject, "Alice shared a file with you: report.pdf");
        assert!(message.html.contains("report.pdf"));
    }
}
