//! Profile Records

use farmstall::identity::{Role, UserUuid};
use jiff::Timestamp;

use crate::domain::profiles::data::ProfileDetails;

/// Profile Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub user: UserUuid,
    pub role: Role,
    pub details: ProfileDetails,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
