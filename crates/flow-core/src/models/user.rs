//! Identity model

use serde::{Deserialize, Serialize};

/// A signed-in user as delivered by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// The active persistence context.
///
/// Guest entries and settings live in the local store only; authenticated
/// data lives in the remote document store keyed by the user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Guest,
    User(String),
}

impl Scope {
    /// The scope implied by an optional signed-in identity.
    #[must_use]
    pub fn from_user(user: Option<&User>) -> Self {
        user.map_or(Self::Guest, |user| Self::User(user.id.clone()))
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    /// The user id for an authenticated scope.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::User(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            display_name: None,
            avatar_url: None,
        }
    }

    #[test]
    fn scope_from_user_maps_identity() {
        assert_eq!(Scope::from_user(None), Scope::Guest);
        assert_eq!(
            Scope::from_user(Some(&user("u1"))),
            Scope::User("u1".to_string())
        );
    }

    #[test]
    fn user_id_only_for_authenticated_scope() {
        assert_eq!(Scope::Guest.user_id(), None);
        assert_eq!(Scope::User("u1".to_string()).user_id(), Some("u1"));
    }
}
