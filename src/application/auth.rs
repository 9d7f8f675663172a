//! API-key authentication and password hashing.
//!
//! Keys are presented in the `Bikinghub-Api-Key` header and stored only as
//! SHA-256 digests. A guarded operation runs only after the guard has fully
//! accepted the credential.

use std::future::Future;
use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _};
use metrics::counter;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::{AuthKeysRepo, CreateAuthKeyParams, RepoError};

pub const API_KEY_HEADER: &str = "Bikinghub-Api-Key";

const METRIC_AUTH_REJECTED: &str = "bikinghub_auth_rejected_total";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or unknown api key")]
    Unauthenticated,
    #[error("api key lacks the required privilege")]
    Forbidden,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthLevel {
    User,
    Admin,
}

impl AuthLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Who a verified key belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPrincipal {
    pub key_id: i64,
    pub user_id: i64,
    pub admin: bool,
}

impl AuthPrincipal {
    /// Admins act for everyone; users only for themselves.
    pub fn may_act_for(&self, user_id: i64) -> bool {
        self.admin || self.user_id == user_id
    }

    pub fn require_self_or_admin(&self, user_id: i64) -> Result<(), AuthError> {
        if self.may_act_for(user_id) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

pub trait KeyHasher: Send + Sync {
    fn hash(&self, secret: &str) -> Vec<u8>;

    fn constant_time_eq(&self, a: &[u8], b: &[u8]) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256KeyHasher;

impl KeyHasher for Sha256KeyHasher {
    fn hash(&self, secret: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hasher.finalize().to_vec()
    }

    fn constant_time_eq(&self, a: &[u8], b: &[u8]) -> bool {
        a.ct_eq(b).into()
    }
}

pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    fn verify_password(&self, password: &str, stored: &str) -> bool;
}

/// Argon2id with default parameters, stored as PHC strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|err| AuthError::Hashing(err.to_string()))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthError::Hashing(err.to_string()))
    }

    fn verify_password(&self, password: &str, stored: &str) -> bool {
        PasswordHash::new(stored).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

#[derive(Clone)]
pub struct AuthGuard {
    keys: Arc<dyn AuthKeysRepo>,
    hasher: Arc<dyn KeyHasher>,
}

impl AuthGuard {
    pub fn new(keys: Arc<dyn AuthKeysRepo>, hasher: Arc<dyn KeyHasher>) -> Self {
        Self { keys, hasher }
    }

    /// Verify `credential` at `level`.
    ///
    /// Admin lookups bind the presented hash and the admin flag together; a
    /// valid user key never satisfies the admin level.
    pub async fn authorize(
        &self,
        credential: Option<&str>,
        level: AuthLevel,
    ) -> Result<AuthPrincipal, AuthError> {
        let result = self.verify(credential, level).await;
        if let Err(err) = &result {
            counter!(METRIC_AUTH_REJECTED, "level" => level.as_str()).increment(1);
            debug!(level = level.as_str(), error = %err, "api key rejected");
        }
        result
    }

    async fn verify(
        &self,
        credential: Option<&str>,
        level: AuthLevel,
    ) -> Result<AuthPrincipal, AuthError> {
        let credential = credential
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let computed = self.hasher.hash(credential);
        let stored = match level {
            AuthLevel::User => self.keys.find_by_hash(&computed).await?,
            AuthLevel::Admin => self.keys.find_admin_by_hash(&computed).await?,
        }
        .ok_or(AuthError::Unauthenticated)?;

        if !self.hasher.constant_time_eq(&computed, &stored.key_hash) {
            return Err(AuthError::Unauthenticated);
        }

        Ok(AuthPrincipal {
            key_id: stored.id,
            user_id: stored.user_id,
            admin: stored.admin,
        })
    }

    /// Run `operation` only when `credential` passes at `level`.
    pub async fn guarded<F, Fut, T>(
        &self,
        credential: Option<&str>,
        level: AuthLevel,
        operation: F,
    ) -> Result<T, AuthError>
    where
        F: FnOnce(AuthPrincipal) -> Fut,
        Fut: Future<Output = T>,
    {
        let principal = self.authorize(credential, level).await?;
        Ok(operation(principal).await)
    }

    /// Create a key for `user_id`. The plain key is returned once and only
    /// its digest is stored.
    pub async fn issue_key(&self, user_id: i64, admin: bool) -> Result<IssuedKey, AuthError> {
        let key = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let record = self
            .keys
            .create_key(CreateAuthKeyParams {
                key_hash: self.hasher.hash(&key),
                user_id,
                admin,
            })
            .await?;
        Ok(IssuedKey {
            key,
            key_id: record.id,
            admin: record.admin,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub key: String,
    pub key_id: i64,
    pub admin: bool,
}
