/// JWT Token Issuing and Verification
///
/// `TokenCodec` is built once from `JwtSettings` at startup and shared read-only.
/// Signing is HS256 with the configured secret.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenKind};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};
use crate::users::User;

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenCodec {
    /// # Errors
    /// Returns a configuration error if the settings fail validation
    pub fn new(config: &JwtSettings) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_settings(config))
    }

    fn from_settings(config: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        // Expiry is exact; a token is dead the second after `exp`
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
        }
    }

    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> i64 {
        self.refresh_ttl
    }

    /// Issue a short-lived access token carrying email and role
    pub fn issue_access_token(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims::access(&user.email, user.role, self.access_ttl, &self.issuer);
        self.sign(&claims)
    }

    /// Issue a long-lived refresh token carrying the email only
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims::refresh(&user.email, self.refresh_ttl, &self.issuer);
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature, issuer and expiry, returning the embedded claims.
    ///
    /// # Errors
    /// * `TokenExpired` - signature is valid but `exp` has passed
    /// * `TokenInvalid` - anything else (bad signature, malformed, wrong issuer)
    pub fn decode_and_verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::warn!("JWT rejected: expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::warn!(error = %e, "JWT rejected: invalid");
                    AuthError::TokenInvalid
                }
            })
    }

    /// Verify a token and require it to be an access token with a role
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode_and_verify(token)?;
        if claims.typ != TokenKind::Access || claims.role.is_none() {
            tracing::warn!(email = %claims.sub, "Refresh token presented as access token");
            return Err(AuthError::TokenInvalid);
        }
        Ok(claims)
    }

    /// Verify a token and require it to be a refresh token
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode_and_verify(token)?;
        if claims.typ != TokenKind::Refresh {
            tracing::warn!(email = %claims.sub, "Access token presented as refresh token");
            return Err(AuthError::TokenInvalid);
        }
        Ok(claims)
    }
}
