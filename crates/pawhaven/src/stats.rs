//! Platform-wide counters shown on the landing page.

use std::collections::HashMap;
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

use crate::accounts::Role;
use crate::adoptions::{ApplicationScope, ApplicationStatus};
use crate::http::repository_response;
use crate::pets::{PetStatus, Species};
use crate::store::{PlatformStore, RepositoryError};

/// How many completed adoptions the summary lists.
pub const RECENT_ADOPTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesCount {
    pub species: Species,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentAdoption {
    pub pet_name: String,
    pub species: Species,
    pub adopter_first_name: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_pets: usize,
    pub available_pets: usize,
    pub adopted_pets: usize,
    pub pending_applications: usize,
    pub total_shelters: usize,
    pub total_adopters: usize,
    /// Largest count first; ties by species name.
    pub pets_by_species: Vec<SpeciesCount>,
    pub recent_adoptions: Vec<RecentAdoption>,
}

pub struct StatsService<S> {
    store: Arc<S>,
}

impl<S> StatsService<S>
where
    S: PlatformStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn summary(&self) -> Result<PlatformStats, RepositoryError> {
        let pets = self.store.pets()?;
        let applications = self.store.applications(ApplicationScope::All)?;

        let mut by_species: HashMap<Species, usize> = HashMap::new();
        for pet in &pets {
            *by_species.entry(pet.attributes.species).or_default() += 1;
        }
        let mut pets_by_species: Vec<SpeciesCount> = by_species
            .into_iter()
            .map(|(species, count)| SpeciesCount { species, count })
            .collect();
        pets_by_species.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.species.label().cmp(b.species.label()))
        });

        let mut completed: Vec<_> = applications
            .iter()
            .filter(|application| application.status == ApplicationStatus::Completed)
            .filter_map(|application| {
                application
                    .completed_at
                    .map(|completed_at| (completed_at, application))
            })
            .collect();
        completed.sort_by(|a, b| b.0.cmp(&a.0));

        let mut recent_adoptions = Vec::with_capacity(RECENT_ADOPTIONS);
        for (completed_at, application) in completed {
            if recent_adoptions.len() == RECENT_ADOPTIONS {
                break;
            }
            let (Some(pet), Some(adopter)) = (
                pets.iter().find(|pet| pet.id == application.pet_id),
                self.store.user(application.applicant_id)?,
            ) else {
                continue;
            };
            recent_adoptions.push(RecentAdoption {
                pet_name: pet.name().to_string(),
                species: pet.attributes.species,
                adopter_first_name: adopter.first_name,
                completed_at,
            });
        }

        let stats = PlatformStats {
            total_pets: pets.len(),
            available_pets: count_status(&pets, PetStatus::Available),
            adopted_pets: count_status(&pets, PetStatus::Adopted),
            pending_applications: applications
                .iter()
                .filter(|application| application.status == ApplicationStatus::Pending)
                .count(),
            total_shelters: self.store.count_users(Role::Shelter)?,
            total_adopters: self.store.count_users(Role::Adopter)?,
            pets_by_species,
            recent_adoptions,
        };
        debug!(
            total_pets = stats.total_pets,
            pending_applications = stats.pending_applications,
            "platform stats computed"
        );
        Ok(stats)
    }
}

fn count_status(pets: &[crate::pets::Pet], status: PetStatus) -> usize {
    pets.iter().filter(|pet| pet.status == status).count()
}

pub fn stats_router<S>(service: Arc<StatsService<S>>) -> Router
where
    S: PlatformStore + 'static,
{
    Router::new()
        .route("/api/v1/stats", get(stats_handler::<S>))
        .with_state(service)
}

pub(crate) async fn stats_handler<S>(State(service): State<Arc<StatsService<S>>>) -> Response
where
    S: PlatformStore + 'static,
{
    match service.summary() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => repository_response(&error),
    }
}
