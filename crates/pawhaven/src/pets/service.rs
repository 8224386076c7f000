use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    main_image, FavoriteToggle, Pet, PetAttributes, PetDetail, PetId, PetImage, PetImageId,
    PetImageUpload, PetStatus, PetSummary, PetUpdate,
};
use super::search::{PetOrdering, PetQuery, SearchFilters};
use crate::access::{Actor, Capability, PermissionError};
use crate::accounts::{Role, User, UserId};
use crate::adoptions::ApplicationKind;
use crate::http::{Page, PageLimits, PageOutOfRange, PageRequest};
use crate::store::{PlatformStore, RepositoryError};
use crate::validation::{is_blank, ValidationErrors};

static PET_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static IMAGE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_pet_id() -> PetId {
    PetId(PET_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_image_id() -> PetImageId {
    PetImageId(IMAGE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Builds the card projection of a pet for `viewer`.
pub(crate) fn pet_summary<S>(
    store: &S,
    pet: &Pet,
    viewer: Option<UserId>,
) -> Result<PetSummary, RepositoryError>
where
    S: PlatformStore,
{
    let shelter = store.user(pet.shelter_id)?;
    let profile = store.shelter_profile(pet.shelter_id)?;
    let images = store.images(pet.id)?;
    let is_favorited = match viewer {
        Some(user_id) => store.is_favorite(user_id, pet.id)?,
        None => false,
    };
    let attributes = &pet.attributes;

    Ok(PetSummary {
        id: pet.id,
        name: attributes.name.clone(),
        species: attributes.species,
        breed: attributes.breed.clone(),
        age_years: attributes.age_years,
        age_months: attributes.age_months,
        age_display: pet.age_display(),
        gender: attributes.gender,
        size: attributes.size,
        weight: attributes.weight,
        color: attributes.color.clone(),
        status: pet.status,
        adoption_fee: attributes.adoption_fee,
        good_with_kids: attributes.good_with_kids,
        good_with_dogs: attributes.good_with_dogs,
        good_with_cats: attributes.good_with_cats,
        house_trained: attributes.house_trained,
        is_spayed_neutered: attributes.is_spayed_neutered,
        is_vaccinated: attributes.is_vaccinated,
        shelter_name: match (&profile, &shelter) {
            (Some(profile), _) => Some(profile.organization_name.clone()),
            (None, Some(user)) => Some(user.display_name()),
            (None, None) => None,
        },
        shelter_city: shelter
            .as_ref()
            .map(|user| user.city.clone())
            .filter(|city| !city.is_empty()),
        main_image: main_image(&images).map(|image| image.path.clone()),
        is_favorited,
        created_at: pet.created_at,
    })
}

/// Catalog management, browsing and favorites.
pub struct PetService<S> {
    store: Arc<S>,
    limits: PageLimits,
}

impl<S> PetService<S>
where
    S: PlatformStore + 'static,
{
    pub fn new(store: Arc<S>, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn create(&self, actor: &Actor, attributes: PetAttributes) -> Result<Pet, PetError> {
        Capability::CreatePet.check(actor)?;
        attributes.validate()?;

        let now = Utc::now();
        let pet = self.store.insert_pet(Pet {
            id: next_pet_id(),
            shelter_id: actor.id,
            attributes,
            status: PetStatus::Available,
            created_at: now,
            updated_at: now,
        })?;

        info!(pet_id = pet.id.0, shelter_id = actor.id.0, "pet listed");
        Ok(pet)
    }

    pub fn update(&self, actor: &Actor, pet_id: PetId, changes: PetUpdate) -> Result<Pet, PetError> {
        let current = self.pet(pet_id)?;
        Capability::MutatePet {
            owner: current.shelter_id,
        }
        .check(actor)?;

        let mut preview = current.attributes;
        changes.clone().apply(&mut preview);
        preview.validate()?;

        let pet = match self.store.update_pet(pet_id, changes, Utc::now()) {
            Ok(pet) => pet,
            Err(RepositoryError::NotFound) => return Err(PetError::NotFound),
            Err(other) => return Err(other.into()),
        };
        info!(pet_id = pet.id.0, status = pet.status.label(), "pet updated");
        Ok(pet)
    }

    pub fn delete(&self, actor: &Actor, pet_id: PetId) -> Result<(), PetError> {
        let pet = self.pet(pet_id)?;
        Capability::MutatePet {
            owner: pet.shelter_id,
        }
        .check(actor)?;

        self.store.delete_pet(pet_id)?;
        info!(pet_id = pet_id.0, "pet removed");
        Ok(())
    }

    pub fn detail(&self, pet_id: PetId, viewer: Option<&Actor>) -> Result<PetDetail, PetError> {
        let pet = self.pet(pet_id)?;
        let images = self.store.images(pet_id)?;
        let shelter = self.store.shelter_profile(pet.shelter_id)?;

        let (is_favorited, can_apply) = match viewer {
            Some(actor) => {
                let is_favorited = self.store.is_favorite(actor.id, pet_id)?;
                let can_apply = actor.role == Role::Adopter
                    && pet.status == PetStatus::Available
                    && self
                        .store
                        .find_application(actor.id, pet_id, ApplicationKind::Full)?
                        .is_none();
                (is_favorited, can_apply)
            }
            None => (false, false),
        };

        debug!(pet_id = pet_id.0, "pet detail read");
        Ok(PetDetail {
            age_display: pet.age_display(),
            pet,
            shelter,
            images,
            is_favorited,
            can_apply,
        })
    }

    /// Available pets matching the listing filters.
    pub fn list(
        &self,
        query: &PetQuery,
        page: PageRequest,
        viewer: Option<&Actor>,
    ) -> Result<Page<PetSummary>, PetError> {
        let ordering = query.ordering()?;
        let mut pets = self.available_matching(|pet, shelter| query.matches(pet, shelter))?;
        ordering.sort(&mut pets);
        self.page_of(pets, page, viewer)
    }

    /// Available pets matching the advanced search payload, newest first.
    pub fn search(
        &self,
        filters: &SearchFilters,
        page: PageRequest,
        viewer: Option<&Actor>,
    ) -> Result<Page<PetSummary>, PetError> {
        let mut pets = self.available_matching(|pet, shelter| filters.matches(pet, shelter))?;
        PetOrdering::default().sort(&mut pets);
        self.page_of(pets, page, viewer)
    }

    /// Every pet the calling shelter owns, whatever its status.
    pub fn my_pets(&self, actor: &Actor) -> Result<Vec<PetSummary>, PetError> {
        Capability::ListOwnPets.check(actor)?;
        let mut pets = self.store.pets_by_shelter(actor.id)?;
        PetOrdering::default().sort(&mut pets);
        pets.iter()
            .map(|pet| pet_summary(self.store.as_ref(), pet, Some(actor.id)))
            .collect::<Result<Vec<_>, RepositoryError>>()
            .map_err(PetError::from)
    }

    pub fn add_image(
        &self,
        actor: &Actor,
        pet_id: PetId,
        upload: PetImageUpload,
    ) -> Result<PetImage, PetError> {
        let pet = self.pet(pet_id)?;
        Capability::MutatePet {
            owner: pet.shelter_id,
        }
        .check(actor)?;

        if is_blank(&upload.path) {
            return Err(ValidationErrors::single("path", "this field is required").into());
        }
        let content_type = mime_guess::from_path(&upload.path)
            .first()
            .filter(|guessed| guessed.type_() == mime::IMAGE)
            .ok_or_else(|| ValidationErrors::single("path", "upload a valid image file"))?;

        let image = self.store.insert_image(PetImage {
            id: next_image_id(),
            pet_id,
            path: upload.path,
            content_type: content_type.essence_str().to_string(),
            caption: upload.caption,
            is_primary: upload.is_primary,
            uploaded_at: Utc::now(),
        })?;

        info!(pet_id = pet_id.0, image_id = image.id.0, "pet image stored");
        Ok(image)
    }

    pub fn toggle_favorite(&self, actor: &Actor, pet_id: PetId) -> Result<FavoriteToggle, PetError> {
        Capability::ToggleFavorite.check(actor)?;
        let pet = self.pet(pet_id)?;

        let favorited = self.store.toggle_favorite(actor.id, pet_id, Utc::now())?;
        let message = if favorited {
            format!("{} added to favorites", pet.name())
        } else {
            format!("{} removed from favorites", pet.name())
        };

        debug!(pet_id = pet_id.0, user_id = actor.id.0, favorited, "favorite toggled");
        Ok(FavoriteToggle { favorited, message })
    }

    /// The caller's favorites, most recently favorited first.
    pub fn favorites(&self, actor: &Actor, page: PageRequest) -> Result<Page<PetSummary>, PetError> {
        let favorites = self.store.favorites_of(actor.id)?;
        let mut pets = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            if let Some(pet) = self.store.pet(favorite.pet_id)? {
                pets.push(pet);
            }
        }
        self.page_of(pets, page, Some(actor))
    }

    fn pet(&self, pet_id: PetId) -> Result<Pet, PetError> {
        self.store.pet(pet_id)?.ok_or(PetError::NotFound)
    }

    fn available_matching(
        &self,
        predicate: impl Fn(&Pet, Option<&User>) -> bool,
    ) -> Result<Vec<Pet>, PetError> {
        let mut shelters: HashMap<UserId, Option<User>> = HashMap::new();
        let mut matching = Vec::new();
        for pet in self.store.pets()? {
            if pet.status != PetStatus::Available {
                continue;
            }
            let shelter = match shelters.get(&pet.shelter_id) {
                Some(shelter) => shelter.clone(),
                None => {
                    let shelter = self.store.user(pet.shelter_id)?;
                    shelters.insert(pet.shelter_id, shelter.clone());
                    shelter
                }
            };
            if predicate(&pet, shelter.as_ref()) {
                matching.push(pet);
            }
        }
        Ok(matching)
    }

    fn page_of(
        &self,
        pets: Vec<Pet>,
        request: PageRequest,
        viewer: Option<&Actor>,
    ) -> Result<Page<PetSummary>, PetError> {
        let page = self.limits.paginate(pets, request)?;
        let viewer = viewer.map(|actor| actor.id);
        let results = page
            .results
            .iter()
            .map(|pet| pet_summary(self.store.as_ref(), pet, viewer))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            count: page.count,
            page: page.page,
            next: page.next,
            previous: page.previous,
            results,
        })
    }
}

/// Error raised by the pet service.
#[derive(Debug, thiserror::Error)]
pub enum PetError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error("pet not found")]
    NotFound,
    #[error(transparent)]
    Page(#[from] PageOutOfRange),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
