//! Profile Data

use farmstall::identity::{Role, UserUuid};

/// Contact and delivery details saved against a user account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDetails {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub landmark: Option<String>,
}

/// New Profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub user: UserUuid,
    pub role: Role,
    pub details: ProfileDetails,
}
