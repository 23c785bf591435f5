//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::ParticipantId;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier), recorded as `processed_by`/`decided_by`
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Participant the caller acts as, for investor and partner tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        has_role(self, roles::ADMIN)
    }

    /// Fails unless the caller is an administrator
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::MissingPermission(roles::ADMIN.to_string()))
        }
    }

    /// Fails unless the caller is an administrator or acts as `participant`
    pub fn require_self_or_admin(&self, participant: ParticipantId) -> Result<(), AuthError> {
        if self.is_admin() || self.participant_id == Some(participant) {
            Ok(())
        } else {
            Err(AuthError::MissingPermission(format!("access to {}", participant)))
        }
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier
/// * `roles` - User's roles
/// * `participant_id` - Participant an investor or partner token acts as
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    participant_id: Option<ParticipantId>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        participant_id,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == roles::ADMIN)
}

/// Role names carried in tokens
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const INVESTOR: &str = "investor";
    pub const PARTNER: &str = "partner";
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip_keeps_participant() {
        let participant = ParticipantId::new();
        let token = create_token("ana", vec![roles::INVESTOR.into()], Some(participant), SECRET, 60).unwrap();

        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "ana");
        assert_eq!(claims.participant_id, Some(participant));
        assert!(!claims.is_admin());
        assert!(claims.require_self_or_admin(participant).is_ok());
        assert!(claims.require_self_or_admin(ParticipantId::new()).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("root", vec![roles::ADMIN.into()], None, SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_admin_satisfies_every_role() {
        let token = create_token("root", vec![roles::ADMIN.into()], None, SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert!(has_role(&claims, roles::PARTNER));
        assert!(claims.require_admin().is_ok());
        assert!(claims.require_self_or_admin(ParticipantId::new()).is_ok());
    }
}
