use serde::{Deserialize, Serialize};
use thiserror::Error;

use spectr_core::UserId;

use crate::permissions::granted_to;
use crate::{Permission, Role};

/// The authenticated subject of an engine call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Ownership restriction for record lookups.
    ///
    /// `None` means unrestricted (admins); users only ever see their own rows.
    pub fn owner_scope(&self) -> Option<UserId> {
        match self.role {
            Role::Admin => None,
            Role::User => Some(self.user_id),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check that an actor's role grants `required`.
///
/// Pure policy check: no IO, no ownership lookup (see [`Actor::owner_scope`]).
pub fn authorize(actor: &Actor, required: &Permission) -> Result<(), AuthzError> {
    let granted = granted_to(actor.role)
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_wildcard_grants_everything() {
        let admin = Actor::admin(UserId::new());
        assert!(authorize(&admin, &Permission::ORDERS_SET_STATUS).is_ok());
        assert!(authorize(&admin, &Permission::STATS_READ).is_ok());
        assert!(authorize(&admin, &Permission::new("anything.at_all")).is_ok());
    }

    #[test]
    fn user_cannot_set_status_or_read_stats() {
        let user = Actor::user(UserId::new());
        assert!(authorize(&user, &Permission::ORDERS_PLACE).is_ok());
        assert!(authorize(&user, &Permission::PAYMENTS_CONFIRM).is_ok());

        match authorize(&user, &Permission::ORDERS_SET_STATUS) {
            Err(AuthzError::Forbidden(p)) => assert_eq!(p, "orders.set_status"),
            other => panic!("Expected Forbidden, got {other:?}"),
        }
        assert!(authorize(&user, &Permission::STATS_READ).is_err());
    }

    #[test]
    fn owner_scope_restricts_users_only() {
        let id = UserId::new();
        assert_eq!(Actor::user(id).owner_scope(), Some(id));
        assert_eq!(Actor::admin(id).owner_scope(), None);
    }
}
