use anyhow::Result;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims issued by the identity provider. The subject is the employee's user
/// id; this service trusts it without further validation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Validates bearer tokens minted by the identity provider. This service only
/// verifies; it never issues tokens.
pub struct JwtManager {
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn mint_token(secret: &str, user_id: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + 3600,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_provider_token_and_extracts_subject() {
        let manager = JwtManager::new("test-secret");
        let token = mint_token("test-secret", "emp-42");
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "emp-42");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let manager = JwtManager::new("secret-b");
        let token = mint_token("secret-a", "emp-42");
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;

        let claims = Claims {
            sub: "emp-42".to_string(),
            exp: now - 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let manager = JwtManager::new("test-secret");
        assert!(manager.validate_token(&token).is_err());
    }
}
