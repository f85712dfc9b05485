//! Security audit logging for authentication events
//!
//! Registrations, logins and rejected bearer tokens are logged at INFO level
//! with the "audit" target, so they can be filtered and routed apart from
//! application logs (`RUST_LOG=audit=info`).
//!
//! Passwords and tokens never appear in an event.
//!
//! Author: hephaex@gmail.com

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Security audit events for authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// New credential stored
    RegistrationSuccess {
        user_id: i64,
        username: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Registration rejected or failed
    RegistrationFailure {
        username: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Token issued
    LoginSuccess {
        username: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Login rejected; `reason` is internal and never sent to the client
    LoginFailure {
        username: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Bearer token missing, malformed, forged or expired
    InvalidToken {
        path: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },
}

/// Request metadata attached to audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditContext {
    /// When the request was seen
    pub timestamp: DateTime<Utc>,
    /// Client IP address (from proxy headers)
    pub ip_address: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for AuditContext {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
            ip_address: None,
            user_agent: None,
        }
    }
}

impl AuditContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            timestamp: Utc::now(),
            ip_address: extract_ip_address(headers),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// Log a security audit event with structured fields
///
/// The whole event is also attached as JSON under `event` for log aggregators.
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::RegistrationSuccess {
            user_id,
            username,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                username = %username,
                ip_address = ?ip_address,
                "Registration successful"
            );
        }
        AuditEvent::RegistrationFailure {
            username,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                reason = %reason,
                ip_address = ?ip_address,
                "Registration failed"
            );
        }
        AuditEvent::LoginSuccess {
            username,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                ip_address = ?ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            username,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                reason = %reason,
                ip_address = ?ip_address,
                "Login failed"
            );
        }
        AuditEvent::InvalidToken {
            path,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                path = %path,
                reason = %reason,
                ip_address = ?ip_address,
                "Invalid token"
            );
        }
    }
}

/// Extract the client IP address from proxy headers
///
/// Checks X-Forwarded-For (first hop), then X-Real-IP.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|ip| ip.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract the user agent from request headers
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginFailure {
            username: "alice".to_string(),
            reason: "password mismatch".to_string(),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: None,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"login_failure\""));
        assert!(json.contains("alice"));
    }

    #[test]
    fn test_audit_log_all_events() {
        // Only checks that logging never panics
        let ctx = AuditContext::default();
        audit_log(&AuditEvent::RegistrationSuccess {
            user_id: 1,
            username: "alice".to_string(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        });
        audit_log(&AuditEvent::RegistrationFailure {
            username: "alice".to_string(),
            reason: "duplicate username".to_string(),
            ip_address: None,
            user_agent: None,
        });
        audit_log(&AuditEvent::LoginSuccess {
            username: "alice".to_string(),
            ip_address: None,
            user_agent: None,
        });
        audit_log(&AuditEvent::InvalidToken {
            path: "/api/v1/employees".to_string(),
            reason: "Token has expired".to_string(),
            ip_address: None,
            user_agent: Some("curl/8.0".to_string()),
        });
    }

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.7".parse().unwrap());

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn test_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::USER_AGENT,
            "Mozilla/5.0 (Test)".parse().unwrap(),
        );

        let ctx = AuditContext::from_headers(&headers);
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0 (Test)"));
        assert_eq!(ctx.ip_address, None);
    }
}
