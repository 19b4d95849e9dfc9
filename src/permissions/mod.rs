//! Role permissions: the catalog of identifiers the admin API understands and
//! the pure evaluator that checks a held set against a requirement.
//!
//! The evaluator never touches the store. Resolving a user's held set is the
//! job of [`crate::middleware::CurrentUser`], which re-reads it on every request.

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

pub const BLOGS_VIEW: &str = "blogs.view";
pub const BLOGS_CREATE: &str = "blogs.create";
pub const BLOGS_EDIT: &str = "blogs.edit";
pub const BLOGS_DELETE: &str = "blogs.delete";

pub const CASE_STUDIES_VIEW: &str = "case_studies.view";
pub const CASE_STUDIES_CREATE: &str = "case_studies.create";
pub const CASE_STUDIES_EDIT: &str = "case_studies.edit";
pub const CASE_STUDIES_DELETE: &str = "case_studies.delete";

pub const USERS_VIEW: &str = "users.view";
pub const USERS_CREATE: &str = "users.create";
pub const USERS_EDIT: &str = "users.edit";
pub const USERS_DELETE: &str = "users.delete";

pub const USER_TYPES_VIEW: &str = "user_types.view";
pub const USER_TYPES_CREATE: &str = "user_types.create";
pub const USER_TYPES_EDIT: &str = "user_types.edit";
pub const USER_TYPES_DELETE: &str = "user_types.delete";

/// Permissions grouped by admin module, in display order
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PermissionGroup {
    pub module: &'static str,
    pub label: &'static str,
    pub permissions: &'static [&'static str],
}

pub const CATALOG: &[PermissionGroup] = &[
    PermissionGroup {
        module: "blogs",
        label: "Blogs",
        permissions: &[BLOGS_VIEW, BLOGS_CREATE, BLOGS_EDIT, BLOGS_DELETE],
    },
    PermissionGroup {
        module: "case_studies",
        label: "Case studies",
        permissions: &[CASE_STUDIES_VIEW, CASE_STUDIES_CREATE, CASE_STUDIES_EDIT, CASE_STUDIES_DELETE],
    },
    PermissionGroup {
        module: "users",
        label: "Users",
        permissions: &[USERS_VIEW, USERS_CREATE, USERS_EDIT, USERS_DELETE],
    },
    PermissionGroup {
        module: "user_types",
        label: "User types",
        permissions: &[USER_TYPES_VIEW, USER_TYPES_CREATE, USER_TYPES_EDIT, USER_TYPES_DELETE],
    },
];

/// Every permission in the catalog, flattened
pub fn all() -> Vec<&'static str> {
    CATALOG.iter().flat_map(|g| g.permissions.iter().copied()).collect()
}

pub fn is_known(permission: &str) -> bool {
    CATALOG.iter().any(|g| g.permissions.contains(&permission))
}

/// The set of permission identifiers a caller holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sorted copy, for stable serialization
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut v: Vec<String> = self.0.iter().cloned().collect();
        v.sort();
        v
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// What an operation requires: one permission, or any one of several
#[derive(Debug, Clone, Copy)]
pub enum Required<'a> {
    One(&'a str),
    Any(&'a [&'a str]),
}

impl<'a> Required<'a> {
    fn identifiers(&self) -> Vec<String> {
        match self {
            Required::One(p) => vec![p.to_string()],
            Required::Any(ps) => ps.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl<'a> From<&'a str> for Required<'a> {
    fn from(permission: &'a str) -> Self {
        Required::One(permission)
    }
}

impl<'a> From<&'a [&'a str]> for Required<'a> {
    fn from(permissions: &'a [&'a str]) -> Self {
        Required::Any(permissions)
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for Required<'a> {
    fn from(permissions: &'a [&'a str; N]) -> Self {
        Required::Any(permissions.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("missing permission: {}", .missing.join(" | "))]
    Unauthorized { missing: Vec<String> },
}

/// True when `held` grants `required`. A list is satisfied by any one entry.
/// An empty held set grants nothing.
pub fn has_permission<'a>(held: &PermissionSet, required: impl Into<Required<'a>>) -> bool {
    if held.is_empty() {
        return false;
    }
    match required.into() {
        Required::One(p) => held.contains(p),
        Required::Any(ps) => ps.iter().any(|p| held.contains(p)),
    }
}

/// True when every entry of `required` is held.
pub fn has_all_permissions(held: &PermissionSet, required: &[&str]) -> bool {
    required.iter().all(|p| held.contains(p))
}

/// Same evaluation as [`has_permission`], failing with the identifiers that
/// would have satisfied the check.
pub fn require_permission<'a>(
    held: &PermissionSet,
    required: impl Into<Required<'a>>,
) -> Result<(), PermissionError> {
    let required = required.into();
    if has_permission(held, required) {
        Ok(())
    } else {
        Err(PermissionError::Unauthorized { missing: required.identifiers() })
    }
}
