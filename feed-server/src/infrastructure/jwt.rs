use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims of the session tokens issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: usize,
}

pub struct JwtService {
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        tracing::debug!(
            "Initializing JwtService with secret length: {}",
            secret.len()
        );

        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is too short ({} chars). Minimum recommended is 32 chars.",
                secret.len()
            );
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Claims of a valid token; `None` for forged, expired or malformed ones.
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                tracing::debug!("Token verified for user_id: {}", token_data.claims.user_id);
                Some(token_data.claims)
            }
            Err(e) => {
                tracing::debug!("Token verification failed: {}", e);
                None
            }
        }
    }
}
