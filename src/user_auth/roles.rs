//! Roles and per-route access declarations.

/// Role as seen by the authorization gate.
///
/// Only the administrator has a fixed identity; every other role row is
/// carried by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Administrator,
    Other(i32),
}

impl Role {
    pub const ADMINISTRATOR_ID: i32 = 1;

    pub fn from_id(id: i32) -> Self {
        match id {
            Self::ADMINISTRATOR_ID => Role::Administrator,
            other => Role::Other(other),
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Role::Administrator => Self::ADMINISTRATOR_ID,
            Role::Other(id) => id,
        }
    }
}

/// What a route group requires beyond a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Any caller holding a valid session token
    Authenticated,
    /// Caller's role must be in the list
    Roles(&'static [Role]),
}

impl RouteAccess {
    pub const ADMIN_ONLY: RouteAccess = RouteAccess::Roles(&[Role::Administrator]);

    pub fn permits(self, role: Role) -> bool {
        match self {
            RouteAccess::Authenticated => true,
            RouteAccess::Roles(allowed) => allowed.contains(&role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_id_round_trip() {
        assert_eq!(Role::from_id(1), Role::Administrator);
        assert_eq!(Role::from_id(64), Role::Other(64));
        assert_eq!(Role::Administrator.id(), 1);
        assert_eq!(Role::from_id(7).id(), 7);
    }

    #[test]
    fn test_authenticated_permits_everyone() {
        for id in [1, 64, 7, 0, -3] {
            assert!(RouteAccess::Authenticated.permits(Role::from_id(id)));
        }
    }

    #[test]
    fn test_admin_only() {
        assert!(RouteAccess::ADMIN_ONLY.permits(Role::from_id(1)));
        assert!(!RouteAccess::ADMIN_ONLY.permits(Role::from_id(64)));
        assert!(!RouteAccess::ADMIN_ONLY.permits(Role::from_id(2)));
    }

    #[test]
    fn test_multi_role_allow_list() {
        const TREASURY: RouteAccess = RouteAccess::Roles(&[Role::Administrator, Role::Other(64)]);
        assert!(TREASURY.permits(Role::from_id(1)));
        assert!(TREASURY.permits(Role::from_id(64)));
        assert!(!TREASURY.permits(Role::from_id(3)));
    }
}
