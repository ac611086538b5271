//! Caller Identity
//!
//! Authentication happens elsewhere; this module only describes the resolved
//! session that reaches the order lifecycle.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use thiserror::Error;

use crate::uuids::TypedUuid;

/// Marker for user account identifiers.
#[derive(Debug)]
pub struct UserAccount;

/// User UUID
pub type UserUuid = TypedUuid<UserAccount>;

/// Role attached to a resolved session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular shopper.
    User,

    /// Catalog seller.
    Seller,

    /// Store operator.
    Admin,
}

impl Role {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised role text.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Raised when the caller lacks the role an operation needs.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("operation requires the {required} role, caller has {actual}")]
pub struct Forbidden {
    /// Role the operation requires.
    pub required: Role,

    /// Role the caller holds.
    pub actual: Role,
}

/// The resolved session context of whoever is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Authenticated user, `None` for guests.
    pub user: Option<UserUuid>,

    /// Role of the session.
    pub role: Role,
}

impl Caller {
    /// Unauthenticated shopper.
    #[must_use]
    pub const fn guest() -> Self {
        Self {
            user: None,
            role: Role::User,
        }
    }

    /// Authenticated shopper.
    #[must_use]
    pub const fn user(user: UserUuid) -> Self {
        Self {
            user: Some(user),
            role: Role::User,
        }
    }

    /// Authenticated operator.
    #[must_use]
    pub const fn admin(user: UserUuid) -> Self {
        Self {
            user: Some(user),
            role: Role::Admin,
        }
    }

    /// Whether the session holds the operator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require the operator role.
    ///
    /// # Errors
    ///
    /// Returns [`Forbidden`] for any other role.
    pub fn require_admin(&self) -> Result<(), Forbidden> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Forbidden {
                required: Role::Admin,
                actual: self.role,
            })
        }
    }

    /// Whether the caller may read data owned by `owner`.
    #[must_use]
    pub fn can_read(&self, owner: Option<UserUuid>) -> bool {
        self.is_admin() || (owner.is_some() && self.user == owner)
    }
}
