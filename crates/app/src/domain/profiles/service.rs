//! Profiles service.

use async_trait::async_trait;
use farmstall::identity::UserUuid;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::profiles::{
        data::NewProfile, errors::ProfilesServiceError, records::ProfileRecord,
        repository::PgProfilesRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProfilesService {
    db: Db,
    repository: PgProfilesRepository,
}

impl PgProfilesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProfilesRepository::new(),
        }
    }
}

#[async_trait]
impl ProfilesService for PgProfilesService {
    async fn get_profile(&self, user: UserUuid) -> Result<ProfileRecord, ProfilesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let profile = self.repository.get_profile(&mut tx, user).await?;

        tx.commit().await?;

        Ok(profile)
    }

    #[tracing::instrument(
        name = "profiles.service.upsert_profile",
        skip(self, profile),
        fields(user_uuid = %profile.user, role = %profile.role),
        err
    )]
    async fn upsert_profile(
        &self,
        profile: NewProfile,
    ) -> Result<ProfileRecord, ProfilesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let saved = self.repository.upsert_profile(&mut tx, &profile).await?;

        tx.commit().await?;

        info!(user_uuid = %saved.user, "saved profile");

        Ok(saved)
    }
}

#[automock]
#[async_trait]
pub trait ProfilesService: Send + Sync {
    /// Retrieve the profile saved for `user`.
    async fn get_profile(&self, user: UserUuid) -> Result<ProfileRecord, ProfilesServiceError>;

    /// Create or replace the profile of `profile.user`.
    async fn upsert_profile(
        &self,
        profile: NewProfile,
    ) -> Result<ProfileRecord, ProfilesServiceError>;
}

#[cfg(test)]
mod tests {
    use farmstall::identity::Role;
    use testresult::TestResult;

    use crate::{domain::profiles::data::ProfileDetails, test::TestContext};

    use super::*;

    fn details() -> ProfileDetails {
        ProfileDetails {
            full_name: Some("Meera Pillai".to_string()),
            phone: Some("9847000001".to_string()),
            address_line1: Some("22 Canal Road".to_string()),
            city: Some("Alappuzha".to_string()),
            state: Some("Kerala".to_string()),
            postal_code: Some("688001".to_string()),
            country: Some("India".to_string()),
            ..ProfileDetails::default()
        }
    }

    #[tokio::test]
    async fn upsert_then_get_returns_saved_details() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        ctx.profiles
            .upsert_profile(NewProfile {
                user,
                role: Role::User,
                details: details(),
            })
            .await?;

        let profile = ctx.profiles.get_profile(user).await?;

        assert_eq!(profile.user, user);
        assert_eq!(profile.role, Role::User);
        assert_eq!(profile.details, details());

        Ok(())
    }

    #[tokio::test]
    async fn upsert_replaces_existing_profile() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        ctx.profiles
            .upsert_profile(NewProfile {
                user,
                role: Role::User,
                details: details(),
            })
            .await?;

        let updated = ctx
            .profiles
            .upsert_profile(NewProfile {
                user,
                role: Role::Admin,
                details: ProfileDetails {
                    landmark: Some("Boat jetty".to_string()),
                    ..details()
                },
            })
            .await?;

        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.details.landmark.as_deref(), Some("Boat jetty"));

        Ok(())
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.profiles.get_profile(UserUuid::new()).await;

        assert!(
            matches!(result, Err(ProfilesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
