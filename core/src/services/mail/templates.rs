//! HTML bodies for transactional mail.

use super::EmailMessage;

const FOOTER: &str = r#"<p style="color:#888;font-size:12px">&copy; Heallink. All rights reserved.</p>"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{title}</title></head><body style="font-family:Arial,sans-serif;max-width:600px;margin:0 auto">{body}{FOOTER}</body></html>"#
    )
}

fn greeting(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => format!("Hello {},", escape(name.trim())),
        _ => "Hello,".to_string(),
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Sent after a password registration
pub fn welcome(to: &str, name: Option<&str>, dashboard_url: &str) -> EmailMessage {
    let body = format!(
        r#"<h1>Welcome to Heallink!</h1><p>{}</p><p>Your account is ready.</p><p><a href="{}">Go to Dashboard</a></p>"#,
        greeting(name),
        escape(dashboard_url)
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Welcome to Heallink".to_string(),
        html: layout("Welcome to Heallink", &body),
    }
}

/// Carries the single-use reset link
pub fn password_reset(to: &str, name: Option<&str>, reset_link: &str, expires_in_minutes: i64) -> EmailMessage {
    let body = format!(
        r#"<h1>Reset Your Password</h1><p>{}</p><p>We received a request to reset your password.</p><p><a href="{}">Reset Password</a></p><p>This link expires in {} minutes. If you did not request a reset you can ignore this e-mail.</p>"#,
        greeting(name),
        escape(reset_link),
        expires_in_minutes
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Reset Your Heallink Password".to_string(),
        html: layout("Reset Your Heallink Password", &body),
    }
}
