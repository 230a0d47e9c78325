use crate::core::ids::{GroupId, ParticipantId};
use serde::{Deserialize, Serialize};

/// An expense-sharing group.
///
/// Members are unique and keep the order in which they were first listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: Vec<ParticipantId>,
}

impl Group {
    pub fn is_member(&self, participant: ParticipantId) -> bool {
        self.members.contains(&participant)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group under the next free id. Repeated member ids collapse.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        members: impl IntoIterator<Item = ParticipantId>,
    ) -> Group {
        let mut unique = Vec::new();
        for member in members {
            if !unique.contains(&member) {
                unique.push(member);
            }
        }

        let group = Group {
            id: GroupId::new(self.groups.len() as u64 + 1),
            name: name.into(),
            members: unique,
        };
        self.groups.push(group.clone());
        group
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn all(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
