//! Bounded in-memory user store manipulated by the API handlers and by
//! provider-state directives.
//!
//! # Design
//! Insertion-ordered `Vec` with a fixed capacity, one instance per app,
//! shared behind `Arc<RwLock<_>>`. Every operation takes the lock through
//! `SharedStore`, so concurrent connections never interleave the
//! scan-then-shift of `remove` with other mutations. Nothing survives a
//! restart; the verifier clears the store between interactions via the
//! teardown directive.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

/// Maximum number of users the store holds.
pub const MAX_USERS: usize = 100;

/// A user record served by the API.
///
/// `created_on` is stamped at insertion time as UTC ISO-8601 with an
/// explicit `+00:00` offset, the format the API has always exposed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_on: String,
}

/// Errors returned by store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store already holds `MAX_USERS` users.
    #[error("user store is at capacity")]
    CapacityExceeded,

    /// No user with the given id exists.
    #[error("no user with id {0}")]
    NotFound(i64),
}

/// Insertion-ordered collection of users, capped at `MAX_USERS`.
#[derive(Debug)]
pub struct UserStore {
    users: Vec<User>,
}

/// The store as handlers see it: one instance per app, locked per operation.
pub type SharedStore = Arc<RwLock<UserStore>>;

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: Vec::with_capacity(MAX_USERS),
        }
    }

    /// Appends a user, stamping `created_on` now.
    ///
    /// Ids are not checked for uniqueness; callers must not add a duplicate.
    /// If they do anyway, `find` returns the earliest insertion.
    pub fn add(&mut self, id: i64, name: &str) -> Result<(), StoreError> {
        if self.users.len() >= MAX_USERS {
            return Err(StoreError::CapacityExceeded);
        }
        self.users.push(User {
            id,
            name: name.to_owned(),
            created_on: Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string(),
        });
        Ok(())
    }

    /// Linear scan for the first user with `id`.
    pub fn find(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    /// Removes the first user with `id`, shifting later entries down.
    ///
    /// A failed removal leaves the store untouched.
    pub fn remove(&mut self, id: i64) -> Result<(), StoreError> {
        let index = self
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.users.remove(index);
        Ok(())
    }

    /// Empties the store.
    pub fn clear(&mut self) {
        self.users.clear();
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
