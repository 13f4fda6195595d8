use uuid::Uuid;

/// Authorization context for a state-machine call. Resolved by the external
/// auth collaborator and passed in explicitly; the core never derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_moderator: bool,
}

impl Actor {
    pub fn user(id: Uuid) -> Self {
        Self {
            id,
            is_moderator: false,
        }
    }

    pub fn moderator(id: Uuid) -> Self {
        Self {
            id,
            is_moderator: true,
        }
    }
}
