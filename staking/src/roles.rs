//! Role-based access control for ledger entry points.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use sylo_types::Address;

use crate::error::StakingError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May change parameters and grant or revoke roles.
    Admin,
    /// May add and remove token and seeker stake.
    StakingManager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::StakingManager => f.write_str("staking-manager"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "staking-manager" | "staking_manager" => Ok(Role::StakingManager),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    members: BTreeMap<Role, BTreeSet<Address>>,
}

impl RoleRegistry {
    /// A registry in which `admin` holds every role.
    pub fn with_admin(admin: Address) -> Self {
        let mut registry = Self::default();
        registry.insert(Role::Admin, admin);
        registry.insert(Role::StakingManager, admin);
        registry
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .is_some_and(|members| members.contains(account))
    }

    pub fn require(&self, role: Role, caller: &Address) -> Result<(), StakingError> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(StakingError::Unauthorized {
                caller: *caller,
                role,
            })
        }
    }

    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.members.get(&role).into_iter().flatten()
    }

    /// Returns `true` if the account did not already hold the role.
    pub(crate) fn insert(&mut self, role: Role, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    pub(crate) fn remove(&mut self, role: Role, account: &Address) -> bool {
        self.members
            .get_mut(&role)
            .is_some_and(|members| members.remove(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_parse_back() {
        for role in [Role::Admin, Role::StakingManager] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn admin_holds_both_roles() {
        let admin = Address::from_low_u64(1);
        let roles = RoleRegistry::with_admin(admin);
        assert!(roles.has_role(Role::Admin, &admin));
        assert!(roles.has_role(Role::StakingManager, &admin));
        assert!(!roles.has_role(Role::Admin, &Address::from_low_u64(2)));
    }

    #[test]
    fn require_reports_missing_role() {
        let roles = RoleRegistry::default();
        let caller = Address::from_low_u64(3);
        match roles.require(Role::StakingManager, &caller) {
            Err(StakingError::Unauthorized { caller: c, role }) => {
                assert_eq!(c, caller);
                assert_eq!(role, Role::StakingManager);
            }
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn remove_revokes_role() {
        let admin = Address::from_low_u64(1);
        let mut roles = RoleRegistry::with_admin(admin);
        assert!(roles.remove(Role::StakingManager, &admin));
        assert!(!roles.has_role(Role::StakingManager, &admin));
        assert!(!roles.remove(Role::StakingManager, &admin));
        assert_eq!(roles.members(Role::Admin).count(), 1);
    }
}
