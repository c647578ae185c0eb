//! Caller identity supplied by the upstream identity provider.
//!
//! The service sits behind an authenticating proxy that verifies the
//! caller's credential and forwards the result as two trusted headers.
//! Nothing here re-verifies credentials; it only reads what was forwarded.

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::ApiError;

/// Header carrying the authenticated user's numeric ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Organization administrator.
    Admin,
    /// Student member.
    Student,
}

impl Role {
    /// Lowercase header representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            other => Err(ApiError::Unauthenticated(format!("unknown role {other:?}"))),
        }
    }
}

/// Authenticated caller, extracted from the identity headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// Authenticated user.
    pub user_id: UserId,
    /// Authenticated role.
    pub role: Role,
}

impl Identity {
    /// Reads the identity headers.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] if a header is missing or
    /// malformed.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let user_id = header_str(headers, USER_ID_HEADER)?
            .trim()
            .parse::<i64>()
            .map_err(|_| ApiError::Unauthenticated(format!("malformed {USER_ID_HEADER}")))?;
        let role = header_str(headers, USER_ROLE_HEADER)?.parse::<Role>()?;
        Ok(Self {
            user_id: UserId::new(user_id),
            role,
        })
    }

    /// Returns the caller's user ID if they hold `role`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] otherwise.
    pub fn require(&self, role: Role) -> Result<UserId, ApiError> {
        if self.role == role {
            Ok(self.user_id)
        } else {
            Err(ApiError::Forbidden(format!(
                "this action requires the {} role",
                role.as_str()
            )))
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated(format!("missing {name} header")))
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
