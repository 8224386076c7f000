//! Role-scoped dashboard for the signed-in user.
//!
//! Shelters see their own listings and incoming applications, adopters their own applications,
//! and administrators (role or staff flag) the platform totals.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::access::{Actor, Capability, PermissionError};
use crate::accounts::{Role, User, UserId};
use crate::adoptions::{AdoptionApplication, ApplicationId, ApplicationScope, ApplicationStatus};
use crate::http::{permission_response, repository_response};
use crate::pets::{Pet, PetId, PetStatus, Species};
use crate::store::{PlatformStore, RepositoryError};

/// Length of every "recent" list on the dashboard.
pub const RECENT_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentPet {
    pub id: PetId,
    pub name: String,
    pub species: Species,
    pub status: PetStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentApplication {
    pub id: ApplicationId,
    pub pet_id: PetId,
    pub pet_name: String,
    pub applicant_username: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentUser {
    pub id: UserId,
    pub username: String,
    pub user_type: Role,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelterDashboard {
    pub total_pets: usize,
    pub available_pets: usize,
    pub pending_pets: usize,
    pub adopted_pets: usize,
    pub pending_applications: usize,
    pub approved_applications: usize,
    pub recent_pets: Vec<RecentPet>,
    pub recent_applications: Vec<RecentApplication>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdopterDashboard {
    pub total_applications: usize,
    pub pending_applications: usize,
    pub approved_applications: usize,
    pub completed_adoptions: usize,
    pub recent_applications: Vec<RecentApplication>,
    pub favorite_pets_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminDashboard {
    pub total_users: usize,
    pub total_shelters: usize,
    pub total_adopters: usize,
    pub total_pets: usize,
    pub available_pets: usize,
    pub adopted_pets: usize,
    pub total_applications: usize,
    pub pending_applications: usize,
    pub completed_adoptions: usize,
    pub recent_users: Vec<RecentUser>,
    pub recent_pets: Vec<RecentPet>,
}

/// Serialized with a `dashboard` tag naming the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "dashboard", rename_all = "snake_case")]
pub enum Dashboard {
    Shelter(ShelterDashboard),
    Adopter(AdopterDashboard),
    Admin(AdminDashboard),
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct DashboardService<S> {
    store: Arc<S>,
}

impl<S> DashboardService<S>
where
    S: PlatformStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Staff accounts get the platform view whatever their role.
    pub fn dashboard(&self, actor: &Actor) -> Result<Dashboard, DashboardError> {
        let dashboard = match actor.role {
            Role::Shelter if !actor.is_staff => Dashboard::Shelter(self.shelter(actor.id)?),
            Role::Adopter if !actor.is_staff => Dashboard::Adopter(self.adopter(actor.id)?),
            _ => {
                Capability::ViewPlatformTotals.check(actor)?;
                Dashboard::Admin(self.admin()?)
            }
        };
        debug!(actor_id = actor.id.0, role = actor.role.label(), "dashboard built");
        Ok(dashboard)
    }

    fn shelter(&self, shelter_id: UserId) -> Result<ShelterDashboard, RepositoryError> {
        let pets = self.store.pets_by_shelter(shelter_id)?;
        let applications = self
            .store
            .applications(ApplicationScope::Shelter(shelter_id))?;

        Ok(ShelterDashboard {
            total_pets: pets.len(),
            available_pets: count_pets(&pets, PetStatus::Available),
            pending_pets: count_pets(&pets, PetStatus::Pending),
            adopted_pets: count_pets(&pets, PetStatus::Adopted),
            pending_applications: count_applications(&applications, ApplicationStatus::Pending),
            approved_applications: count_applications(&applications, ApplicationStatus::Approved),
            recent_applications: self.recent_applications(applications)?,
            recent_pets: recent_pets(pets),
        })
    }

    fn adopter(&self, adopter_id: UserId) -> Result<AdopterDashboard, RepositoryError> {
        let applications = self
            .store
            .applications(ApplicationScope::Applicant(adopter_id))?;

        Ok(AdopterDashboard {
            total_applications: applications.len(),
            pending_applications: count_applications(&applications, ApplicationStatus::Pending),
            approved_applications: count_applications(&applications, ApplicationStatus::Approved),
            completed_adoptions: count_applications(&applications, ApplicationStatus::Completed),
            favorite_pets_count: self.store.favorites_of(adopter_id)?.len(),
            recent_applications: self.recent_applications(applications)?,
        })
    }

    fn admin(&self) -> Result<AdminDashboard, RepositoryError> {
        let pets = self.store.pets()?;
        let applications = self.store.applications(ApplicationScope::All)?;

        Ok(AdminDashboard {
            total_users: self.store.total_users()?,
            total_shelters: self.store.count_users(Role::Shelter)?,
            total_adopters: self.store.count_users(Role::Adopter)?,
            total_pets: pets.len(),
            available_pets: count_pets(&pets, PetStatus::Available),
            adopted_pets: count_pets(&pets, PetStatus::Adopted),
            total_applications: applications.len(),
            pending_applications: count_applications(&applications, ApplicationStatus::Pending),
            completed_adoptions: count_applications(&applications, ApplicationStatus::Completed),
            recent_users: self
                .store
                .recent_users(RECENT_ITEMS)?
                .iter()
                .map(recent_user)
                .collect(),
            recent_pets: recent_pets(pets),
        })
    }

    fn recent_applications(
        &self,
        mut applications: Vec<AdoptionApplication>,
    ) -> Result<Vec<RecentApplication>, RepositoryError> {
        applications.sort_by(|a, b| (b.submitted_at, b.id).cmp(&(a.submitted_at, a.id)));
        applications
            .into_iter()
            .take(RECENT_ITEMS)
            .map(|application| {
                let pet_name = self
                    .store
                    .pet(application.pet_id)?
                    .map(|pet| pet.name().to_string())
                    .unwrap_or_default();
                let applicant_username = self
                    .store
                    .user(application.applicant_id)?
                    .map(|user| user.username)
                    .unwrap_or_default();
                Ok(RecentApplication {
                    id: application.id,
                    pet_id: application.pet_id,
                    pet_name,
                    applicant_username,
                    status: application.status,
                    submitted_at: application.submitted_at,
                })
            })
            .collect()
    }
}

fn count_pets(pets: &[Pet], status: PetStatus) -> usize {
    pets.iter().filter(|pet| pet.status == status).count()
}

fn count_applications(applications: &[AdoptionApplication], status: ApplicationStatus) -> usize {
    applications
        .iter()
        .filter(|application| application.status == status)
        .count()
}

fn recent_pets(mut pets: Vec<Pet>) -> Vec<RecentPet> {
    pets.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    pets.into_iter()
        .take(RECENT_ITEMS)
        .map(|pet| RecentPet {
            id: pet.id,
            name: pet.attributes.name,
            species: pet.attributes.species,
            status: pet.status,
            created_at: pet.created_at,
        })
        .collect()
}

fn recent_user(user: &User) -> RecentUser {
    RecentUser {
        id: user.id,
        username: user.username.clone(),
        user_type: user.role,
        date_joined: user.created_at,
    }
}

pub fn dashboard_router<S>(service: Arc<DashboardService<S>>) -> Router
where
    S: PlatformStore + 'static,
{
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .with_state(service)
}

pub(crate) async fn dashboard_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    actor: Actor,
) -> Response
where
    S: PlatformStore + 'static,
{
    match service.dashboard(&actor) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(DashboardError::Permission(error)) => permission_response(&error),
        Err(DashboardError::Repository(error)) => repository_response(&error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use crate::accounts::UserRepository;
    use crate::testing::*;

    #[test]
    fn shelter_dashboard_counts_only_its_own_listings() {
        let (platform, _) = platform();
        let harbor = shelter(&platform, "harbor");
        let other = shelter(&platform, "meadow");
        let adopter = register(&platform, "alex", Role::Adopter);
        let biscuit = list_pet(&platform, &harbor, "Biscuit");
        list_pet(&platform, &harbor, "Mochi");
        list_pet(&platform, &other, "Pepper");
        let application = platform
            .adoptions
            .submit_application(&adopter, submission(biscuit.id))
            .expect("submitted")
            .application
            .id;
        platform
            .adoptions
            .approve(&harbor, application, None)
            .expect("approves");

        let Dashboard::Shelter(view) = platform.dashboard.dashboard(&harbor).expect("builds")
        else {
            panic!("shelters get the shelter dashboard");
        };
        assert_eq!(view.total_pets, 2);
        assert_eq!(view.available_pets, 1);
        assert_eq!(view.pending_pets, 1);
        assert_eq!(view.adopted_pets, 0);
        assert_eq!(view.pending_applications, 0);
        assert_eq!(view.approved_applications, 1);
        assert_eq!(view.recent_pets.len(), 2);
        assert_eq!(view.recent_applications.len(), 1);
        assert_eq!(view.recent_applications[0].pet_name, "Biscuit");
        assert_eq!(view.recent_applications[0].applicant_username, "alex");
    }

    #[test]
    fn adopter_dashboard_tracks_applications_and_favorites() {
        let (platform, _) = platform();
        let harbor = shelter(&platform, "harbor");
        let adopter = register(&platform, "alex", Role::Adopter);
        let pets: Vec<_> = (0..7)
            .map(|index| list_pet(&platform, &harbor, &format!("Pet {index}")))
            .collect();
        for pet in &pets {
            platform
                .adoptions
                .submit_request(&adopter, pet.id, quick_request())
                .expect("request accepted");
        }
        platform
            .pets
            .toggle_favorite(&adopter, pets[0].id)
            .expect("favorited");

        let Dashboard::Adopter(view) = platform.dashboard.dashboard(&adopter).expect("builds")
        else {
            panic!("adopters get the adopter dashboard");
        };
        assert_eq!(view.total_applications, 7);
        assert_eq!(view.pending_applications, 7);
        assert_eq!(view.completed_adoptions, 0);
        assert_eq!(view.favorite_pets_count, 1);
        assert_eq!(view.recent_applications.len(), RECENT_ITEMS);
        assert!(view
            .recent_applications
            .windows(2)
            .all(|pair| pair[0].submitted_at >= pair[1].submitted_at));
    }

    #[test]
    fn administrators_see_platform_totals() {
        let (platform, _) = platform();
        let harbor = shelter(&platform, "harbor");
        register(&platform, "alex", Role::Adopter);
        let admin = register(&platform, "root", Role::Admin);
        list_pet(&platform, &harbor, "Biscuit");

        let Dashboard::Admin(view) = platform.dashboard.dashboard(&admin).expect("builds") else {
            panic!("admins get the platform dashboard");
        };
        assert_eq!(view.total_users, 3);
        assert_eq!(view.total_shelters, 1);
        assert_eq!(view.total_adopters, 1);
        assert_eq!(view.total_pets, 1);
        assert_eq!(view.available_pets, 1);
        assert_eq!(view.recent_users.len(), 3);
        assert_eq!(view.recent_users[0].username, "root");
    }

    #[tokio::test]
    async fn dashboard_route_needs_a_token_and_tags_the_view() {
        let (platform, _) = platform();
        let adopter = register(&platform, "alex", Role::Adopter);
        let token = platform
            .store
            .token_for_user(adopter.id)
            .expect("store readable")
            .expect("token issued")
            .0;

        let anonymous = platform
            .router()
            .oneshot(
                Request::get("/api/v1/dashboard")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let response = platform
            .router()
            .oneshot(
                Request::get("/api/v1/dashboard")
                    .header(header::AUTHORIZATION, format!("Token {token}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["dashboard"], "adopter");
        assert_eq!(body["total_applications"], 0);
        assert_eq!(body["favorite_pets_count"], 0);
    }
}
