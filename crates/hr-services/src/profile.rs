//! Employee profiles and their notifications

use hr_auth::{authorize, Action, CurrentUser, Scope};
use hr_contracts::profile::{ProfileContract, UpdateProfileRequest};
use hr_contracts::Contract;
use hr_core::traits::Id;
use hr_core::HrResult;
use hr_models::{Notification, User};
use tracing::instrument;

use crate::context::{store_id, Repositories};

#[derive(Clone)]
pub struct ProfileService {
    repos: Repositories,
}

impl ProfileService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn me(&self, current: &CurrentUser) -> HrResult<User> {
        self.repos.user(current.id).await
    }

    #[instrument(skip(self), fields(user_id = current.id))]
    pub async fn get(&self, current: &CurrentUser, id: Id) -> HrResult<User> {
        let user = self.repos.user(id).await?;
        let scope = Scope::Employee {
            user_id: id,
            store_id: user.store_id,
        };
        authorize(current, Action::ViewProfile, scope)?;
        Ok(user)
    }

    /// Contact details are self-service; role, store and salary are HR/MD only
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn update(
        &self,
        current: &CurrentUser,
        id: Id,
        request: UpdateProfileRequest,
    ) -> HrResult<User> {
        let mut user = self.repos.user(id).await?;
        let scope = Scope::Employee {
            user_id: id,
            store_id: user.store_id,
        };
        authorize(current, Action::EditProfile, scope)?;

        let changes = ProfileContract::new().validate(&request)?;
        let privileged = changes.privileged_fields();
        if !privileged.is_empty() {
            authorize(current, Action::ManageEmployment, Scope::Global)?;
        }

        changes.apply(&mut user);
        if let Some(name) = &changes.store_name {
            let store = self.repos.store_named(name).await?;
            user.store_id = Some(store_id(&store)?);
            user.store_name = Some(store.name);
        }

        let saved = self.repos.users.update(&user).await?;
        tracing::info!(profile_id = id, ?privileged, "profile updated");
        Ok(saved)
    }

    /// Unread notifications of the caller, newest first
    pub async fn notifications(&self, current: &CurrentUser) -> HrResult<Vec<Notification>> {
        Ok(self.repos.notifications.list_unread(current.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{caller, employee, store, MockRepos};
    use hr_models::Role;
    use rust_decimal_macros::dec;

    fn with_users(mocks: &mut MockRepos) {
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, Role::Employee, Some(10)))));
    }

    fn request(value: serde_json::Value) -> UpdateProfileRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_employee_updates_own_phone() {
        let mut mocks = MockRepos::default();
        with_users(&mut mocks);
        mocks
            .users
            .expect_update()
            .withf(|u| u.phone.as_deref() == Some("9876543210"))
            .returning(|u| Ok(u.clone()));
        let service = ProfileService::new(mocks.build());

        let user = service
            .update(
                &caller(2, Role::Employee, Some(10)),
                2,
                request(serde_json::json!({ "phone": "9876543210" })),
            )
            .await
            .unwrap();
        assert_eq!(user.phone.as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_employee_cannot_raise_own_salary() {
        let mut mocks = MockRepos::default();
        with_users(&mut mocks);
        mocks.users.expect_update().never();
        let service = ProfileService::new(mocks.build());

        let err = service
            .update(
                &caller(2, Role::Employee, Some(10)),
                2,
                request(serde_json::json!({ "basicSalary": 99999 })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_director_cannot_change_roles() {
        let mut mocks = MockRepos::default();
        with_users(&mut mocks);
        let service = ProfileService::new(mocks.build());

        let err = service
            .update(
                &caller(1, Role::StoreDirector, Some(10)),
                2,
                request(serde_json::json!({ "role": "hr_coordinator" })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_hr_moves_employee_to_another_store() {
        let mut mocks = MockRepos::default();
        with_users(&mut mocks);
        mocks
            .stores
            .expect_find_by_name()
            .returning(|name| Ok(Some(store(11, name))));
        mocks
            .users
            .expect_update()
            .withf(|u| u.store_id == Some(11) && u.basic_salary == dec!(30000))
            .returning(|u| Ok(u.clone()));
        let service = ProfileService::new(mocks.build());

        let user = service
            .update(
                &caller(1, Role::Hr, None),
                2,
                request(serde_json::json!({ "storeName": "Andheri", "basicSalary": 30000 })),
            )
            .await
            .unwrap();
        assert_eq!(user.store_name.as_deref(), Some("Andheri"));
    }

    #[tokio::test]
    async fn test_profile_of_another_store_is_forbidden() {
        let mut mocks = MockRepos::default();
        with_users(&mut mocks);
        let service = ProfileService::new(mocks.build());

        let err = service
            .get(&caller(1, Role::HrCoordinator, Some(11)), 2)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = service
            .get(&caller(3, Role::Employee, Some(10)), 2)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
