//! Purpose: Mock session and identity handling mirrored to the user slot.
//! Exports: `Session`, `ActorContext`, and the default artificial delay.
//! Role: Supplies the authenticated actor that exchange operations require.
//! Invariants: Identity derives from the email alone; passwords are ignored.
//! Invariants: The user slot always mirrors the in-memory session.

use crate::core::error::{Error, ErrorKind};
use crate::core::ids::user_id_for_email;
use crate::core::model::{ProfileUpdate, Role, User};
use crate::core::slot::{Slot, SlotStore};
use std::time::Duration;

/// Fixed latency on login and signup, kept from the original mock provider
/// so callers exercise their pending states.
pub const DEFAULT_AUTH_DELAY: Duration = Duration::from_millis(800);

/// Identity snapshot handed to exchange operations. Operations that create
/// or request books authenticate against this instead of reaching for any
/// ambient session state.
#[derive(Clone, Debug, Default)]
pub struct ActorContext {
    user: Option<User>,
}

impl ActorContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn actor(&self) -> Result<&User, Error> {
        self.user.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::Unauthenticated)
                .with_message("operation requires an authenticated actor")
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

#[derive(Debug)]
pub struct Session {
    store: SlotStore,
    current: Option<User>,
    auth_delay: Duration,
}

impl Session {
    /// Open a session over `store`, restoring any persisted user.
    pub fn open(store: SlotStore) -> Self {
        let current: Option<User> = store.load(Slot::User);
        Self {
            store,
            current,
            auth_delay: DEFAULT_AUTH_DELAY,
        }
    }

    pub fn with_auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = delay;
        self
    }

    /// Mock login. Any email/password pair is accepted; the identity is
    /// synthesized from the email, with the local part as display name.
    pub fn login(&mut self, email: &str, _password: &str, role: Role) -> Result<User, Error> {
        let name = email.split('@').next().unwrap_or(email).to_string();
        self.establish(name, email, role)
    }

    /// Mock signup. Same identity derivation as login, with an explicit name.
    pub fn signup(
        &mut self,
        name: &str,
        email: &str,
        _password: &str,
        role: Role,
    ) -> Result<User, Error> {
        self.establish(name.to_string(), email, role)
    }

    fn establish(&mut self, name: String, email: &str, role: Role) -> Result<User, Error> {
        std::thread::sleep(self.auth_delay);
        let user = User {
            id: user_id_for_email(email),
            name,
            email: email.to_string(),
            role,
            location: None,
            phone: None,
            profile_image: None,
        };
        self.store.save(Slot::User, &Some(&user))?;
        tracing::debug!(user = %user.id, role = ?user.role, "session established");
        self.current = Some(user.clone());
        Ok(user)
    }

    /// Clear the session and remove the persisted user.
    pub fn logout(&mut self) -> Result<(), Error> {
        self.store.clear(Slot::User)?;
        if let Some(user) = self.current.take() {
            tracing::debug!(user = %user.id, "session cleared");
        }
        Ok(())
    }

    /// Merge profile fields into the current user and persist the result.
    pub fn update_profile(&mut self, changes: ProfileUpdate) -> Result<User, Error> {
        let Some(current) = self.current.as_ref() else {
            return Err(
                Error::new(ErrorKind::Unauthenticated).with_message("no active session")
            );
        };
        let mut updated = current.clone();
        if let Some(name) = changes.name {
            updated.name = name;
        }
        if let Some(location) = changes.location {
            updated.location = Some(location);
        }
        if let Some(phone) = changes.phone {
            updated.phone = Some(phone);
        }
        if let Some(profile_image) = changes.profile_image {
            updated.profile_image = Some(profile_image);
        }
        self.store.save(Slot::User, &Some(&updated))?;
        self.current = Some(updated.clone());
        Ok(updated)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().map(|user| user.role)
    }

    /// Snapshot the current identity for injection into exchange operations.
    pub fn context(&self) -> ActorContext {
        ActorContext {
            user: self.current.clone(),
        }
    }
}
