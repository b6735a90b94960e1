use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::user::UserProfile;

/// JWT claims carried inside the session cookie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub id: String,    // Subject user id
    pub email: String, // Subject email at issuance time
    pub iat: i64,      // Issued at, seconds since epoch
    pub exp: i64,      // Expiration, seconds since epoch
    pub jti: String,   // Unique token id
}

/// Identity decoded from a verified session cookie, scoped to one request
#[derive(Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    pub subject_id: String,
    pub subject_email: String,
}

impl From<SessionClaims> for SessionIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject_id: claims.id,
            subject_email: claims.email,
        }
    }
}

/// A freshly signed token and the claims inside it
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Outcome of signup/login: who logged in and the session to hand back
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub profile: UserProfile,
    pub token: IssuedToken,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password should contain at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response body shared by all session endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub message: String,
    pub name: String,
    pub email: String,
}

impl SessionResponse {
    pub fn new(message: &str, profile: UserProfile) -> Self {
        Self {
            message: message.to_string(),
            name: profile.name,
            email: profile.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserListResponse {
    pub message: String,
    pub users: Vec<UserProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_session_claims_serialization() {
        let claims = SessionClaims {
            id: "user-id".to_string(),
            email: "a@x.com".to_string(),
            iat: 1234567800,
            exp: 1234567890,
            jti: "token-id".to_string(),
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"id\":\"user-id\""));
        assert!(json.contains("a@x.com"));

        let deserialized: SessionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_identity_from_claims() {
        let claims = SessionClaims {
            id: "user-id".to_string(),
            email: "a@x.com".to_string(),
            iat: 0,
            exp: 1,
            jti: "j".to_string(),
        };

        assert_eq!(
            SessionIdentity::from(claims),
            SessionIdentity {
                subject_id: "user-id".to_string(),
                subject_email: "a@x.com".to_string(),
            }
        );
    }

    #[rstest]
    #[case("A", "a@x.com", "secret", true)]
    #[case("", "a@x.com", "secret", false)]
    #[case("A", "not-an-email", "secret", false)]
    #[case("A", "a@x.com", "12345", false)]
    fn test_signup_validation(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] valid: bool,
    ) {
        let request = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        assert_eq!(request.validate().is_ok(), valid);
    }

    #[rstest]
    #[case("a@x.com", "x", true)]
    #[case("a@x.com", "", false)]
    #[case("ax.com", "secret", false)]
    fn test_login_validation(#[case] email: &str, #[case] password: &str, #[case] valid: bool) {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        assert_eq!(request.validate().is_ok(), valid);
    }

    #[test]
    fn test_session_response_serialization() {
        let response = SessionResponse::new(
            "User verified",
            UserProfile {
                name: "A".to_string(),
                email: "a@x.com".to_string(),
            },
        );

        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "User verified");
        assert_eq!(json["name"], "A");
        assert_eq!(json["email"], "a@x.com");
    }
}
