use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{error, info, warn};

use crate::credentials::{CredentialVerifier, Plaintext};
use crate::models::UserRecord;
use crate::policy::{PasswordPolicy, PolicyViolation};
use crate::store::{StoreError, UserStore};

pub const REGISTERED_MESSAGE: &str = "user registered successfully";

#[derive(thiserror::Error, Debug)]
pub enum AccountError {
    #[error("username and password are required")]
    MissingFields,
    #[error("{0}")]
    WeakPassword(PolicyViolation),
    #[error("username \"{username}\" already exists, please choose another username")]
    Conflict { username: String },
    #[error("invalid username or password")]
    AuthFailure,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AccountError {
    /// Distinguishes a taken username from other validation failures.
    pub fn user_exists(&self) -> bool {
        matches!(self, AccountError::Conflict { .. })
    }
}

pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub username: String,
    pub message: &'static str,
}

/// Registration and login rules on top of a [`UserStore`].
pub struct AccountService {
    store: Arc<dyn UserStore>,
    verifier: Arc<dyn CredentialVerifier>,
    policy: Option<PasswordPolicy>,
    gate: Option<RwLock<()>>,
}

impl AccountService {
    /// Plaintext credentials, no password policy, no lock around the document.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store, verifier: Arc::new(Plaintext), policy: None, gate: None }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Route every access to the document through one reader/writer lock.
    ///
    /// Registrations hold the write side across load/check/append/save; logins and
    /// counts hold the read side. Without this, two concurrent registrations may
    /// both pass the uniqueness check (duplicate username) or overwrite each
    /// other's append (lost user).
    pub fn serialized(mut self) -> Self {
        self.gate = Some(RwLock::new(()));
        self
    }

    pub fn is_serialized(&self) -> bool {
        self.gate.is_some()
    }

    fn read_gate(&self) -> Option<RwLockReadGuard<'_, ()>> {
        self.gate.as_ref().map(|g| g.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write_gate(&self) -> Option<RwLockWriteGuard<'_, ()>> {
        self.gate.as_ref().map(|g| g.write().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn password_policy(&self) -> Option<&PasswordPolicy> {
        self.policy.as_ref()
    }

    pub fn register(&self, username: &str, password: &str) -> AccountResult<Registered> {
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::MissingFields);
        }
        if let Some(policy) = &self.policy {
            policy.check(password).map_err(AccountError::WeakPassword)?;
        }

        let _guard = self.write_gate();

        let mut users = self.store.load_all().inspect_err(log_storage)?;
        if users.iter().any(|u| u.username == username) {
            warn!(username, "registration attempt for existing user");
            return Err(AccountError::Conflict { username: username.to_owned() });
        }
        users.push(UserRecord::new(username, self.verifier.seal(password)));
        self.store.save_all(&users).inspect_err(log_storage)?;

        info!(username, "new user registered");
        Ok(Registered { username: username.to_owned(), message: REGISTERED_MESSAGE })
    }

    /// First record whose username and password both match. `None` does not say which one failed.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AccountResult<Option<UserRecord>> {
        let _guard = self.read_gate();
        let users = self.store.load_all().inspect_err(log_storage)?;
        Ok(users
            .into_iter()
            .find(|u| u.username == username && self.verifier.verify(&u.password, password)))
    }

    pub fn user_count(&self) -> AccountResult<usize> {
        let _guard = self.read_gate();
        Ok(self.store.load_all().inspect_err(log_storage)?.len())
    }
}

fn log_storage(e: &StoreError) {
    error!("user store failure: {e}");
}
