//! Profiles Repository

use farmstall::identity::UserUuid;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_parsed,
    domain::profiles::{
        data::{NewProfile, ProfileDetails},
        records::ProfileRecord,
    },
};

const GET_PROFILE_SQL: &str = include_str!("sql/get_profile.sql");
const UPSERT_PROFILE_SQL: &str = include_str!("sql/upsert_profile.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProfilesRepository;

impl PgProfilesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_profile(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<ProfileRecord, sqlx::Error> {
        query_as::<Postgres, ProfileRecord>(GET_PROFILE_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn upsert_profile(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        profile: &NewProfile,
    ) -> Result<ProfileRecord, sqlx::Error> {
        let details = &profile.details;

        query_as::<Postgres, ProfileRecord>(UPSERT_PROFILE_SQL)
            .bind(profile.user.into_uuid())
            .bind(profile.role.as_str())
            .bind(details.full_name.as_deref())
            .bind(details.phone.as_deref())
            .bind(details.address_line1.as_deref())
            .bind(details.address_line2.as_deref())
            .bind(details.city.as_deref())
            .bind(details.state.as_deref())
            .bind(details.postal_code.as_deref())
            .bind(details.country.as_deref())
            .bind(details.landmark.as_deref())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProfileRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            role: try_get_parsed(row, "role")?,
            details: ProfileDetails {
                full_name: row.try_get("full_name")?,
                phone: row.try_get("phone")?,
                address_line1: row.try_get("address_line1")?,
                address_line2: row.try_get("address_line2")?,
                city: row.try_get("city")?,
                state: row.try_get("state")?,
                postal_code: row.try_get("postal_code")?,
                country: row.try_get("country")?,
                landmark: row.try_get("landmark")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
