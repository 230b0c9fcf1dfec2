use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::Identity;
use crate::database::{NewUser, NoteStore, StoreError, User};

/// Maps authenticated identities onto local user records
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn NoteStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Look up the user for `identity` without creating one
    pub async fn find_user(&self, identity: &Identity) -> Result<Option<User>, StoreError> {
        self.store.find_user_by_subject_id(&identity.subject_id).await
    }

    /// Return the user for `identity`, creating it on first sight.
    ///
    /// Provisioning is idempotent: when a concurrent request wins the insert,
    /// the unique-violation is absorbed and the winner's record is returned.
    pub async fn resolve_or_provision_user(&self, identity: &Identity) -> Result<User, StoreError> {
        if let Some(user) = self.find_user(identity).await? {
            return Ok(user);
        }

        match self.store.create_user(NewUser::from(identity)).await {
            Ok(user) => {
                info!("Provisioned user {} for subject '{}'", user.id, user.subject_id);
                Ok(user)
            }
            Err(err) if err.is_unique_violation() => {
                debug!(
                    "Concurrent provisioning for subject '{}', re-fetching existing user",
                    identity.subject_id
                );
                match self.find_user(identity).await? {
                    Some(user) => Ok(user),
                    None => {
                        warn!(
                            "Unique violation for subject '{}' but no user found on re-fetch",
                            identity.subject_id
                        );
                        Err(err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }
}
