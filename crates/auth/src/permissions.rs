use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier, `"<area>.<action>"`.
///
/// `"*"` is the wildcard granted to admins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const WILDCARD: Permission = Permission(Cow::Borrowed("*"));

    pub const ORDERS_PLACE: Permission = Permission(Cow::Borrowed("orders.place"));
    pub const ORDERS_READ: Permission = Permission(Cow::Borrowed("orders.read"));
    pub const ORDERS_CANCEL: Permission = Permission(Cow::Borrowed("orders.cancel"));
    pub const ORDERS_DELETE: Permission = Permission(Cow::Borrowed("orders.delete"));
    pub const ORDERS_SET_STATUS: Permission = Permission(Cow::Borrowed("orders.set_status"));
    pub const PAYMENTS_CREATE: Permission = Permission(Cow::Borrowed("payments.create"));
    pub const PAYMENTS_CONFIRM: Permission = Permission(Cow::Borrowed("payments.confirm"));
    pub const STATS_READ: Permission = Permission(Cow::Borrowed("stats.read"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

static USER_PERMISSIONS: [Permission; 6] = [
    Permission::ORDERS_PLACE,
    Permission::ORDERS_READ,
    Permission::ORDERS_CANCEL,
    Permission::ORDERS_DELETE,
    Permission::PAYMENTS_CREATE,
    Permission::PAYMENTS_CONFIRM,
];

static ADMIN_PERMISSIONS: [Permission; 1] = [Permission::WILDCARD];

/// Permissions granted by a role.
pub fn granted_to(role: Role) -> &'static [Permission] {
    match role {
        Role::User => &USER_PERMISSIONS,
        Role::Admin => &ADMIN_PERMISSIONS,
    }
}
