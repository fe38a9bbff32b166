//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Token issuing and verification

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, info};

use super::claims::AccessClaims;
use crate::config::SecurityConfig;
use crate::error::{ClinicError, ClinicResult};

/// HS256 token manager
pub struct TokenManager {
    config: SecurityConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    /// Create new token manager
    pub fn new(config: &SecurityConfig) -> ClinicResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(ClinicError::config("security.jwt_secret cannot be empty"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = config.leeway_secs;

        Ok(Self {
            config: config.clone(),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        })
    }

    /// Mint an access token with the configured lifetime
    pub fn issue(&self, subject: &str) -> ClinicResult<String> {
        self.issue_with_ttl(subject, self.config.token_ttl_secs)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl_secs: u64) -> ClinicResult<String> {
        let claims = AccessClaims::new(subject, ttl_secs, &self.config);
        self.encode(&claims)
    }

    /// Sign arbitrary claims
    pub fn encode(&self, claims: &AccessClaims) -> ClinicResult<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ClinicError::internal(&format!("Token generation failed: {}", e)))?;
        info!(subject = %claims.sub, "Issued access token");
        Ok(token)
    }

    /// Check signature, issuer, audience, validity window and token type
    pub fn verify(&self, token: &str) -> ClinicResult<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                ClinicError::authentication("Given token not valid for any token type")
            })?;

        if !data.claims.is_access_token() {
            debug!(token_type = %data.claims.token_type, "Token rejected: wrong type");
            return Err(ClinicError::authentication(
                "Given token not valid for any token type",
            ));
        }
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .field("secret", &"<sensitive>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret-with-enough-entropy".to_string(),
            leeway_secs: 0,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let manager = TokenManager::new(&config()).unwrap();
        let token = manager.issue("frontdesk").unwrap();
        let claims = manager.verify(&token).unwrap();
        assert_eq!(claims.sub, "frontdesk");
        assert_eq!(claims.iss, "petclinic");
        assert_eq!(claims.aud, "petclinic-api");
        assert!(claims.is_access_token());
    }

    #[test]
    fn test_debug_hides_secret() {
        let manager = TokenManager::new(&config()).unwrap();
        let output = format!("{:?}", manager);
        assert!(output.contains("<sensitive>"));
        assert!(!output.contains("entropy"));
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let manager = TokenManager::new(&config()).unwrap();
        let other = TokenManager::new(&SecurityConfig {
            jwt_secret: "some-other-secret".to_string(),
            ..config()
        })
        .unwrap();
        let token = other.issue("intruder").unwrap();
        assert!(matches!(
            manager.verify(&token),
            Err(ClinicError::Authentication { .. })
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let manager = TokenManager::new(&config()).unwrap();
        let mut claims = AccessClaims::new("frontdesk", 60, &config());
        claims.exp = Utc::now().timestamp() - 120;
        claims.nbf = claims.exp - 60;
        let token = manager.encode(&claims).unwrap();
        assert!(manager.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_wrong_audience_and_type() {
        let manager = TokenManager::new(&config()).unwrap();

        let mut claims = AccessClaims::new("frontdesk", 60, &config());
        claims.aud = "someone-else".to_string();
        assert!(manager.verify(&manager.encode(&claims).unwrap()).is_err());

        let mut claims = AccessClaims::new("frontdesk", 60, &config());
        claims.token_type = "refresh".to_string();
        assert!(manager.verify(&manager.encode(&claims).unwrap()).is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = SecurityConfig {
            jwt_secret: String::new(),
            ..SecurityConfig::default()
        };
        assert!(TokenManager::new(&config).is_err());
    }

    #[test]
    fn test_garbage_token() {
        let manager = TokenManager::new(&config()).unwrap();
        let err = manager.verify("not.a.jwt").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authentication error: Given token not valid for any token type"
        );
    }
}
