#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

/// Whether an account sells food or buys it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    /// Posts listings and reads tickets at the counter.
    Business,
    /// Browses listings, fills a cart and places orders.
    Customer,
}

/// Menu the presentation layer should show after login.
pub type MenuKind = AccountKind;

/// Registered account. Credentials are stored and compared as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    username: String,
    password: String,
    kind: AccountKind,
}

impl User {
    pub fn new(kind: AccountKind, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            kind,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn is_business(&self) -> bool {
        self.kind == AccountKind::Business
    }

    /// Exact, case-sensitive comparison of both credentials.
    pub fn matches_credentials(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}
