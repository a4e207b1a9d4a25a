//! Credential Lifecycle
//! Bootstrap, verification and rotation of the single admin password

use crate::auth::{
    models::{AdminCredential, CredentialError, CredentialState, PasswordChange, ADMIN_USERNAME},
    password::PasswordHasher,
    store::CredentialStore,
};
use crate::config::Config;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Owns the admin credential lifecycle. Built once at startup and shared.
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    initial_password: String,
}

impl CredentialService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        initial_password: impl Into<String>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            store,
            hasher,
            initial_password: initial_password.into(),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn CredentialStore>) -> Self {
        Self::new(store, config.initial_password(), PasswordHasher::new())
    }

    pub fn state(&self) -> Result<CredentialState> {
        Ok(CredentialState::from_record(
            self.store.find_admin_credential()?,
        ))
    }

    /// Stored credential, if bootstrapped.
    pub fn admin_info(&self) -> Result<Option<AdminCredential>> {
        self.store.find_admin_credential()
    }

    pub fn admin_count(&self) -> Result<i64> {
        self.store.count_admin_credentials()
    }

    /// Verify a login password. The first correct use of the initial
    /// password creates the credential.
    pub fn authenticate(&self, password: &str) -> Result<bool> {
        match self.state()? {
            CredentialState::Active(credential) => {
                self.hasher.verify(password, &credential.password_hash)
            }
            CredentialState::Uninitialized => {
                if password != self.initial_password {
                    debug!("Login rejected: initial password mismatch");
                    return Ok(false);
                }

                let password_hash = self.hasher.hash(password)?;
                match self
                    .store
                    .create_admin_credential(ADMIN_USERNAME, &password_hash)?
                {
                    Some(_) => {
                        info!("🔐 Admin credential created during authentication");
                        Ok(true)
                    }
                    None => {
                        // Lost a bootstrap race; check against the winner's hash.
                        let credential = self
                            .store
                            .find_admin_credential()?
                            .context("Admin credential missing after bootstrap conflict")?;
                        self.hasher.verify(password, &credential.password_hash)
                    }
                }
            }
        }
    }

    /// Check the current password without ever creating a credential.
    pub fn validate_current_password(&self, password: &str) -> Result<bool> {
        match self.state()? {
            CredentialState::Active(credential) => {
                self.hasher.verify(password, &credential.password_hash)
            }
            CredentialState::Uninitialized => Ok(password == self.initial_password),
        }
    }

    /// Rotate the admin password after proving knowledge of the current one.
    pub fn change_password(
        &self,
        current: &str,
        new: &str,
    ) -> Result<PasswordChange, CredentialError> {
        let credential = match self.state()? {
            CredentialState::Active(credential) => credential,
            CredentialState::Uninitialized => {
                if current != self.initial_password {
                    warn!("❌ Password change rejected: initial password mismatch");
                    return Err(CredentialError::IncorrectCurrentPassword);
                }

                let password_hash = self.hasher.hash(new)?;
                if self
                    .store
                    .create_admin_credential(ADMIN_USERNAME, &password_hash)?
                    .is_some()
                {
                    info!("✅ Admin credential created with new password");
                    return Ok(PasswordChange::Set);
                }

                // Another request bootstrapped first; rotate against its record.
                self.store
                    .find_admin_credential()?
                    .context("Admin credential missing after bootstrap conflict")?
            }
        };

        self.rotate(&credential, current, new)
    }

    fn rotate(
        &self,
        credential: &AdminCredential,
        current: &str,
        new: &str,
    ) -> Result<PasswordChange, CredentialError> {
        if !self.hasher.verify(current, &credential.password_hash)? {
            warn!("❌ Password change rejected: current password verification failed");
            return Err(CredentialError::IncorrectCurrentPassword);
        }

        if self.hasher.verify(new, &credential.password_hash)? {
            return Err(CredentialError::PasswordUnchanged);
        }

        let new_hash = self.hasher.hash(new)?;
        match self.store.update_admin_credential_hash(
            credential.id,
            &credential.password_hash,
            &new_hash,
        )? {
            Some(updated) => {
                info!(updated_at = %updated.updated_at, "✅ Admin password changed");
                Ok(PasswordChange::Changed)
            }
            None => {
                // A concurrent rotation won; the verified password is stale.
                warn!("Password change lost a concurrent update, rejecting");
                Err(CredentialError::IncorrectCurrentPassword)
            }
        }
    }

    /// Startup bootstrap: create the credential from the initial password
    /// if none exists. Failures are logged; lazy bootstrap still applies.
    pub fn initialize_admin(&self) {
        match self.bootstrap() {
            Ok(true) => {
                info!("✅ Admin credential initialized from the initial password");
                warn!("⚠️  Change the initial admin password after first login");
            }
            Ok(false) => info!("✅ Admin credential already exists"),
            Err(e) => error!("❌ Error initializing admin credential: {:#}", e),
        }
    }

    fn bootstrap(&self) -> Result<bool> {
        if self.state()?.is_active() {
            return Ok(false);
        }

        let password_hash = self.hasher.hash(&self.initial_password)?;
        Ok(self
            .store
            .create_admin_credential(ADMIN_USERNAME, &password_hash)?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryCredentialStore;

    const INITIAL: &str = "150703";

    fn create_service() -> (CredentialService, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let service = CredentialService::new(store.clone(), INITIAL, PasswordHasher::with_cost(4));
        (service, store)
    }

    #[test]
    fn test_authenticate_bootstraps_with_initial_password() {
        let (service, store) = create_service();
        assert!(!service.state().unwrap().is_active());

        assert!(service.authenticate(INITIAL).unwrap());

        let hash = store.stored_hash().unwrap();
        assert!(PasswordHasher::with_cost(4).verify(INITIAL, &hash).unwrap());
        assert!(service.state().unwrap().is_active());
    }

    #[test]
    fn test_authenticate_wrong_password_leaves_uninitialized() {
        let (service, store) = create_service();

        assert!(!service.authenticate("not-the-initial").unwrap());
        assert!(store.stored_hash().is_none());
        assert_eq!(service.state().unwrap(), CredentialState::Uninitialized);
    }

    #[test]
    fn test_authenticate_bootstraps_once() {
        let (service, store) = create_service();

        assert!(service.authenticate(INITIAL).unwrap());
        let first_hash = store.stored_hash().unwrap();

        assert!(service.authenticate(INITIAL).unwrap());
        assert_eq!(store.stored_hash().unwrap(), first_hash);
        assert_eq!(service.admin_count().unwrap(), 1);
    }

    /// Store where a competing request creates the credential just before
    /// this caller's insert lands.
    struct ContestedStore {
        inner: MemoryCredentialStore,
        winner_hash: String,
    }

    impl CredentialStore for ContestedStore {
        fn find_admin_credential(&self) -> Result<Option<AdminCredential>> {
            self.inner.find_admin_credential()
        }

        fn create_admin_credential(
            &self,
            username: &str,
            password_hash: &str,
        ) -> Result<Option<AdminCredential>> {
            self.inner
                .create_admin_credential(username, &self.winner_hash)?;
            self.inner.create_admin_credential(username, password_hash)
        }

        fn update_admin_credential_hash(
            &self,
            id: i64,
            expected_hash: &str,
            new_hash: &str,
        ) -> Result<Option<AdminCredential>> {
            self.inner
                .update_admin_credential_hash(id, expected_hash, new_hash)
        }

        fn count_admin_credentials(&self) -> Result<i64> {
            self.inner.count_admin_credentials()
        }
    }

    fn contested_service(winner_password: &str) -> (CredentialService, Arc<ContestedStore>) {
        let hasher = PasswordHasher::with_cost(4);
        let store = Arc::new(ContestedStore {
            inner: MemoryCredentialStore::new(),
            winner_hash: hasher.hash(winner_password).unwrap(),
        });
        let service = CredentialService::new(store.clone(), INITIAL, hasher);
        (service, store)
    }

    #[test]
    fn test_authenticate_lost_bootstrap_race_checks_winner() {
        let (service, store) = contested_service(INITIAL);

        assert!(service.authenticate(INITIAL).unwrap());

        // The winner's row is kept, not overwritten by the loser's hash.
        let stored = store.inner.stored_hash().unwrap();
        assert_eq!(stored, store.winner_hash);
        assert_eq!(service.admin_count().unwrap(), 1);
    }

    #[test]
    fn test_authenticate_lost_bootstrap_race_to_other_password() {
        let (service, store) = contested_service("rotated-elsewhere");

        assert!(!service.authenticate(INITIAL).unwrap());
        assert_eq!(store.inner.stored_hash().unwrap(), store.winner_hash);
        assert!(service.authenticate("rotated-elsewhere").unwrap());
    }

    #[test]
    fn test_authenticate_bootstrap_failure_is_an_error() {
        let (service, store) = create_service();
        store.set_fail_writes(true);

        assert!(service.authenticate(INITIAL).is_err());
        assert!(store.stored_hash().is_none());
    }

    #[test]
    fn test_validate_current_password_never_bootstraps() {
        let (service, store) = create_service();

        assert!(service.validate_current_password(INITIAL).unwrap());
        assert!(!service.validate_current_password("wrong").unwrap());
        assert!(store.stored_hash().is_none());

        service.authenticate(INITIAL).unwrap();
        assert!(service.validate_current_password(INITIAL).unwrap());
        assert!(!service.validate_current_password("wrong").unwrap());
    }

    #[test]
    fn test_change_password_from_uninitialized() {
        let (service, store) = create_service();

        let outcome = service.change_password(INITIAL, "newpass1").unwrap();
        assert_eq!(outcome, PasswordChange::Set);

        assert!(store.stored_hash().is_some());
        assert!(service.authenticate("newpass1").unwrap());
        assert!(!service.authenticate(INITIAL).unwrap());
    }

    #[test]
    fn test_change_password_uninitialized_wrong_current() {
        let (service, store) = create_service();

        let err = service.change_password("guess", "newpass1").unwrap_err();
        assert!(matches!(err, CredentialError::IncorrectCurrentPassword));
        assert!(store.stored_hash().is_none());
    }

    #[test]
    fn test_change_password_wrong_current_keeps_hash() {
        let (service, store) = create_service();
        service.authenticate(INITIAL).unwrap();
        let before = store.stored_hash().unwrap();

        let err = service.change_password("wrong", "newpass1").unwrap_err();
        assert!(matches!(err, CredentialError::IncorrectCurrentPassword));
        assert_eq!(store.stored_hash().unwrap(), before);
    }

    #[test]
    fn test_change_password_unchanged_keeps_hash() {
        let (service, store) = create_service();
        service.authenticate(INITIAL).unwrap();
        let before = store.stored_hash().unwrap();

        let err = service.change_password(INITIAL, INITIAL).unwrap_err();
        assert!(matches!(err, CredentialError::PasswordUnchanged));
        assert_eq!(store.stored_hash().unwrap(), before);
    }

    #[test]
    fn test_change_password_persistence_failure() {
        let (service, store) = create_service();
        service.authenticate(INITIAL).unwrap();
        let before = store.stored_hash().unwrap();
        store.set_fail_writes(true);

        let err = service.change_password(INITIAL, "newpass1").unwrap_err();
        assert!(matches!(err, CredentialError::Persistence(_)));
        assert_eq!(store.stored_hash().unwrap(), before);

        store.set_fail_writes(false);
        assert!(service.authenticate(INITIAL).unwrap());
    }

    #[test]
    fn test_stale_rotation_is_rejected() {
        let (service, store) = create_service();
        service.authenticate(INITIAL).unwrap();
        let stale = service.admin_info().unwrap().unwrap();

        // Someone else rotates first.
        service.change_password(INITIAL, "winner-1").unwrap();

        let err = service.rotate(&stale, INITIAL, "loser-22").unwrap_err();
        assert!(matches!(err, CredentialError::IncorrectCurrentPassword));
        assert!(service.authenticate("winner-1").unwrap());
        assert!(!service.authenticate("loser-22").unwrap());
        assert!(store.stored_hash().is_some());
    }

    #[test]
    fn test_rotation_scenario() {
        let (service, _store) = create_service();

        assert!(service.authenticate("150703").unwrap());
        assert_eq!(
            service.change_password("150703", "newpass1").unwrap(),
            PasswordChange::Changed
        );
        assert!(!service.authenticate("150703").unwrap());
        assert!(service.authenticate("newpass1").unwrap());

        let err = service.change_password("newpass1", "newpass1").unwrap_err();
        assert!(matches!(err, CredentialError::PasswordUnchanged));
    }

    #[test]
    fn test_initialize_admin_is_idempotent() {
        let (service, store) = create_service();

        service.initialize_admin();
        let hash = store.stored_hash().unwrap();
        service.initialize_admin();

        assert_eq!(store.stored_hash().unwrap(), hash);
        assert!(service.authenticate(INITIAL).unwrap());
    }

    #[test]
    fn test_initialize_admin_survives_store_failure() {
        let (service, store) = create_service();
        store.set_fail_writes(true);

        service.initialize_admin();
        assert!(store.stored_hash().is_none());

        store.set_fail_writes(false);
        assert!(service.authenticate(INITIAL).unwrap());
    }
}
