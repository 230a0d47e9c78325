use crate::core::ids::ParticipantId;
use serde::{Deserialize, Serialize};

/// A person who can pay for or share in expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ParticipantId,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: Vec<User>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user under the next free id.
    pub fn create(&mut self, name: impl Into<String>) -> User {
        let user = User {
            id: ParticipantId::new(self.users.len() as u64 + 1),
            name: name.into(),
        };
        self.users.push(user.clone());
        user
    }

    pub fn get(&self, id: ParticipantId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Display name of a user, if one is registered under `id`.
    pub fn name_of(&self, id: ParticipantId) -> Option<&str> {
        self.get(id).map(|u| u.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
