//! In-memory store used by unit tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use crate::db::{
    CredentialLookup, StoreError, TokenLedger, UserDirectory, UserMaintenance, UserWriter,
};
use crate::domain::{Environment, NewUser, User, UserId, UserPatch};

const TIMESTAMP: &str = "2024-01-01T00:00:00+00:00";

fn user(id: i32, name: &str, credential: &str, is_admin: bool, tokens: i64) -> User {
    User {
        id: UserId::new(id),
        display_name: name.to_string(),
        credential: credential.to_string(),
        is_admin,
        tokens_remaining: tokens,
        created_at: TIMESTAMP.to_string(),
        updated_at: TIMESTAMP.to_string(),
    }
}

pub fn admin_user() -> User {
    user(1, "Admin", "ADMIN", true, 100)
}

pub fn default_user() -> User {
    user(2, "Default", "DEFAULT", false, 10)
}

pub fn other_user() -> User {
    user(3, "Other", "OTHER", false, 5)
}

pub fn broke_user() -> User {
    user(4, "Broke", "BROKE", false, 0)
}

fn injected_failure() -> StoreError {
    StoreError::Database(sea_orm::DbErr::Custom("injected failure".to_string()))
}

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    next_id: AtomicI32,
    fail_reads: bool,
    fail_writes: bool,
    environment: Environment,
    consume_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn with_users(users: Vec<User>) -> Self {
        let next_id = users.iter().map(|u| u.id.value()).max().unwrap_or(0) + 1;
        Self {
            users: Mutex::new(users),
            next_id: AtomicI32::new(next_id),
            ..Self::default()
        }
    }

    /// Every call fails with a database error.
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Reads succeed, writes fail.
    pub fn failing_writes(users: Vec<User>) -> Self {
        Self {
            fail_writes: true,
            ..Self::with_users(users)
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn consume_calls(&self) -> usize {
        self.consume_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialLookup for MemoryStore {
    async fn find_by_credential(&self, credential: &str) -> Result<Option<User>, StoreError> {
        if self.fail_reads {
            return Err(injected_failure());
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.credential == credential)
            .cloned())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        if self.fail_reads {
            return Err(injected_failure());
        }
        Ok(self.user(id))
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        if self.fail_reads {
            return Err(injected_failure());
        }
        Ok(self.all())
    }
}

#[async_trait]
impl UserWriter for MemoryStore {
    async fn insert(&self, new: &NewUser) -> Result<UserId, StoreError> {
        if self.fail_writes {
            return Err(injected_failure());
        }
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.credential == new.credential) {
            return Err(StoreError::CredentialTaken);
        }
        let id = UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        users.push(User {
            id,
            display_name: new.display_name.clone(),
            credential: new.credential.clone(),
            is_admin: new.is_admin,
            tokens_remaining: new.tokens_remaining,
            created_at: TIMESTAMP.to_string(),
            updated_at: TIMESTAMP.to_string(),
        });
        Ok(id)
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<bool, StoreError> {
        if self.fail_writes {
            return Err(injected_failure());
        }
        let mut users = self.users.lock().unwrap();
        if let Some(credential) = &patch.credential
            && users.iter().any(|u| u.id != id && &u.credential == credential)
        {
            return Err(StoreError::CredentialTaken);
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        if let Some(name) = &patch.display_name {
            user.display_name.clone_from(name);
        }
        if let Some(credential) = &patch.credential {
            user.credential.clone_from(credential);
        }
        if let Some(is_admin) = patch.is_admin {
            user.is_admin = is_admin;
        }
        if let Some(tokens) = patch.tokens_remaining {
            user.tokens_remaining = tokens;
        }
        Ok(true)
    }
}

#[async_trait]
impl TokenLedger for MemoryStore {
    async fn consume_tokens(&self, id: UserId, cost: i64) -> Result<bool, StoreError> {
        self.consume_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(injected_failure());
        }
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) if user.tokens_remaining >= cost => {
                user.tokens_remaining -= cost;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl UserMaintenance for MemoryStore {
    async fn drop_and_reseed(&self, seed: &[NewUser]) -> Result<Vec<UserId>, StoreError> {
        if !self.environment.is_local() {
            return Err(StoreError::EnvironmentNotAllowed(
                self.environment.to_string(),
            ));
        }
        if self.fail_writes {
            return Err(injected_failure());
        }
        self.users.lock().unwrap().clear();
        let mut ids = Vec::with_capacity(seed.len());
        for new in seed {
            ids.push(self.insert(new).await?);
        }
        Ok(ids)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_reads {
            return Err(injected_failure());
        }
        Ok(())
    }
}
