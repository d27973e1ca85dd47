use anyhow::Error;
use once_cell::sync::Lazy;
use rocket::serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewCompetitions,
    ViewMembers,
    ViewAnalytics,

    RegisterEntries,
    LogResults,
    ManageMembers,

    ManageCompetitions,
    ManageClubs,
    ManageMartialArts,
    ManageUsers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Viewer,
    Coach,
    Admin,
}

static VIEWER_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewCompetitions);
    permissions.insert(Permission::ViewMembers);
    permissions.insert(Permission::ViewAnalytics);

    permissions
});

static COACH_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(VIEWER_PERMISSIONS.iter().copied());

    permissions.insert(Permission::RegisterEntries);
    permissions.insert(Permission::LogResults);
    permissions.insert(Permission::ManageMembers);

    permissions
});

static ADMIN_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(COACH_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ManageCompetitions);
    permissions.insert(Permission::ManageClubs);
    permissions.insert(Permission::ManageMartialArts);
    permissions.insert(Permission::ManageUsers);

    permissions
});

impl Role {
    pub fn permissions(&self) -> &'static HashSet<Permission> {
        match self {
            Role::Viewer => &VIEWER_PERMISSIONS,
            Role::Coach => &COACH_PERMISSIONS,
            Role::Admin => &ADMIN_PERMISSIONS,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Coach => "coach",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "viewer" => Ok(Role::Viewer),
            "coach" => Ok(Role::Coach),
            "admin" => Ok(Role::Admin),
            _ => Err(Error::msg(format!("Unknown role: {}", s))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_inherit_lower_permissions() {
        for permission in Role::Viewer.permissions() {
            assert!(Role::Coach.has_permission(*permission));
        }
        for permission in Role::Coach.permissions() {
            assert!(Role::Admin.has_permission(*permission));
        }
    }

    #[test]
    fn viewer_cannot_write() {
        assert!(!Role::Viewer.has_permission(Permission::LogResults));
        assert!(!Role::Viewer.has_permission(Permission::RegisterEntries));
        assert!(!Role::Coach.has_permission(Permission::ManageClubs));
    }

    #[test]
    fn role_parse_round_trips_display() {
        for role in [Role::Viewer, Role::Coach, Role::Admin] {
            assert_eq!(Role::parse(&role.to_string()).unwrap(), role);
        }
        assert!(Role::parse("student").is_err());
    }
}
