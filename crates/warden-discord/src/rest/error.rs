//! Classification of REST failures into domain errors

use reqwest::StatusCode;
use serde::Deserialize;
use warden_core::{DomainError, Snowflake};

/// JSON error body returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
    /// Seconds to wait, on 429 only
    #[serde(default)]
    pub retry_after: Option<f64>,
}

/// The resource a request targets, used when a 404 carries no JSON code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Guild(Snowflake),
    Channel(Snowflake),
    Message(Snowflake),
    Role(Snowflake),
    Member(Snowflake),
    Gateway,
}

impl Resource {
    fn not_found(self) -> DomainError {
        match self {
            Self::Guild(id) => DomainError::GuildNotFound(id),
            Self::Channel(id) => DomainError::ChannelNotFound(id),
            Self::Message(id) => DomainError::MessageNotFound(id),
            Self::Role(id) => DomainError::RoleNotFound(id),
            Self::Member(id) => DomainError::MemberNotFound(id),
            Self::Gateway => DomainError::Transient("gateway endpoint not found".to_string()),
        }
    }
}

// JSON error codes for unknown entities
const UNKNOWN_CHANNEL: u32 = 10003;
const UNKNOWN_GUILD: u32 = 10004;
const UNKNOWN_MEMBER: u32 = 10007;
const UNKNOWN_MESSAGE: u32 = 10008;
const UNKNOWN_ROLE: u32 = 10011;
const UNKNOWN_USER: u32 = 10013;

/// Map a non-success response to a [`DomainError`]
///
/// `ids` supplies the identifiers a specific 404 code refers to. A 404
/// carrying any other JSON code is not a vanished entity and maps to
/// `Configuration`; only a 404 without a code falls back to `resource`.
pub fn classify_status(
    status: StatusCode,
    body: Option<&ApiErrorBody>,
    resource: Resource,
    ids: &[Resource],
) -> DomainError {
    let detail = body.map_or_else(
        || status.to_string(),
        |b| format!("{} (code {})", b.message, b.code),
    );

    match status {
        StatusCode::NOT_FOUND => match body {
            Some(b) if b.code != 0 => not_found_for_code(b.code, ids).unwrap_or_else(|| {
                DomainError::Configuration(format!("request rejected: {detail}"))
            }),
            _ => resource.not_found(),
        },
        StatusCode::FORBIDDEN => DomainError::Forbidden(detail),
        StatusCode::UNAUTHORIZED => {
            DomainError::Configuration(format!("bot token rejected: {detail}"))
        }
        _ => DomainError::Transient(format!("HTTP {}: {detail}", status.as_u16())),
    }
}

fn not_found_for_code(code: u32, ids: &[Resource]) -> Option<DomainError> {
    let wanted = |pred: fn(&Resource) -> bool| ids.iter().copied().find(pred);
    let found = match code {
        UNKNOWN_GUILD => wanted(|r| matches!(r, Resource::Guild(_))),
        UNKNOWN_CHANNEL => wanted(|r| matches!(r, Resource::Channel(_))),
        UNKNOWN_MESSAGE => wanted(|r| matches!(r, Resource::Message(_))),
        UNKNOWN_ROLE => wanted(|r| matches!(r, Resource::Role(_))),
        UNKNOWN_MEMBER | UNKNOWN_USER => wanted(|r| matches!(r, Resource::Member(_))),
        _ => None,
    };
    found.map(Resource::not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::ErrorKind;

    fn body(code: u32) -> ApiErrorBody {
        ApiErrorBody {
            code,
            message: "Unknown".to_string(),
            retry_after: None,
        }
    }

    #[test]
    fn test_not_found_uses_specific_code() {
        let ids = [
            Resource::Guild(Snowflake::new(1)),
            Resource::Member(Snowflake::new(2)),
            Resource::Role(Snowflake::new(3)),
        ];
        let err = classify_status(
            StatusCode::NOT_FOUND,
            Some(&body(UNKNOWN_ROLE)),
            Resource::Member(Snowflake::new(2)),
            &ids,
        );
        assert!(matches!(err, DomainError::RoleNotFound(id) if id == Snowflake::new(3)));

        let err = classify_status(
            StatusCode::NOT_FOUND,
            Some(&body(UNKNOWN_MEMBER)),
            Resource::Role(Snowflake::new(3)),
            &ids,
        );
        assert!(matches!(err, DomainError::MemberNotFound(_)));
    }

    #[test]
    fn test_not_found_falls_back_to_resource() {
        let err = classify_status(
            StatusCode::NOT_FOUND,
            None,
            Resource::Message(Snowflake::new(9)),
            &[],
        );
        assert!(matches!(err, DomainError::MessageNotFound(_)));
    }

    #[test]
    fn test_unrecognised_not_found_code_is_not_a_vanished_message() {
        // Unknown Emoji on a reaction listing
        let ids = [
            Resource::Channel(Snowflake::new(4)),
            Resource::Message(Snowflake::new(9)),
        ];
        let err = classify_status(
            StatusCode::NOT_FOUND,
            Some(&body(10014)),
            Resource::Message(Snowflake::new(9)),
            &ids,
        );
        assert!(matches!(err, DomainError::Configuration(_)));
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(!err.is_not_found());

        let err = classify_status(
            StatusCode::NOT_FOUND,
            Some(&body(UNKNOWN_MESSAGE)),
            Resource::Message(Snowflake::new(9)),
            &ids,
        );
        assert!(matches!(err, DomainError::MessageNotFound(id) if id == Snowflake::new(9)));
    }

    #[test]
    fn test_status_kinds() {
        let r = Resource::Guild(Snowflake::new(1));
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, Some(&body(50013)), r, &[]).kind(),
            ErrorKind::Permission
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, None, r, &[]).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            classify_status(StatusCode::BAD_GATEWAY, None, r, &[]).kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, None, r, &[]).kind(),
            ErrorKind::Config
        );
    }
}
