use std::fmt;

use serde::{Deserialize, Serialize};

/// The acting user for one orchestrator command.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    user_key: String,
    pub display_name: Option<String>,
}

impl User {
    pub fn new(user_key: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            display_name: None,
        }
    }

    /// The stable key recorded as depositor and creator (usually an email).
    pub fn user_key(&self) -> &str {
        &self.user_key
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User({})", self.user_key)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{name} <{}>", self.user_key),
            None => f.write_str(&self.user_key),
        }
    }
}
