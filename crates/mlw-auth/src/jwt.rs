use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use mlw_core::models::ids::UserId;

use crate::error::AuthError;

/// Claims carried by an access token. `sub` is the decimal user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Validates HS256 access tokens signed with a shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// `issuer`, when set, must match the token's `iss` claim.
    pub fn hs256(secret: &[u8], issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Validate `token` and return the identity it was issued to.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation)?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidToken(format!("subject is not a user id: {:?}", data.claims.sub)))
    }
}

/// Sign an access token for `user`, valid for `ttl_secs` seconds.
pub fn issue_token(
    secret: &[u8],
    user: UserId,
    ttl_secs: u64,
    issuer: Option<&str>,
) -> Result<String, AuthError> {
    let now = u64::try_from(jiff::Timestamp::now().as_second()).unwrap_or_default();
    let claims = AccessClaims {
        sub: user.to_string(),
        exp: now + ttl_secs,
        iat: now,
        iss: issuer.map(str::to_string),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}
