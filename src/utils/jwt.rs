use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" or "refresh"
}

/// Verifies access tokens issued by the auth service. Tokens are only minted here in tests.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn encode_claims(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "access" {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn claims(token_type: &str, role: UserRole) -> Claims {
        let now = Utc::now();
        Claims {
            sub: "42".to_string(),
            role,
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        }
    }

    #[test]
    fn test_verify_access_token() {
        let jwt = JwtService::new("secret");
        let token = jwt
            .encode_claims(&claims("access", UserRole::StoreAdmin))
            .unwrap();
        let decoded = jwt.verify_access_token(&token).unwrap();
        assert_eq!(decoded.sub, "42");
        assert_eq!(decoded.role, UserRole::StoreAdmin);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let jwt = JwtService::new("secret");
        let token = jwt
            .encode_claims(&claims("refresh", UserRole::Customer))
            .unwrap();
        assert!(matches!(
            jwt.verify_access_token(&token),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtService::new("secret")
            .encode_claims(&claims("access", UserRole::SuperAdmin))
            .unwrap();
        assert!(JwtService::new("other").verify_access_token(&token).is_err());
    }
}
