use chrono::{DateTime, Utc};

use super::domain::{Pet, PetFavorite, PetId, PetImage, PetUpdate};
use crate::accounts::UserId;
use crate::store::RepositoryError;

/// Storage abstraction for pets, their images and favorites.
pub trait PetRepository: Send + Sync {
    /// Fails with `MissingReference` when the shelter account does not exist.
    fn insert_pet(&self, pet: Pet) -> Result<Pet, RepositoryError>;
    /// Merges `changes` into the stored pet. The status is only written when `changes` sets it.
    fn update_pet(
        &self,
        id: PetId,
        changes: PetUpdate,
        at: DateTime<Utc>,
    ) -> Result<Pet, RepositoryError>;
    fn pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;
    fn pets(&self) -> Result<Vec<Pet>, RepositoryError>;
    fn pets_by_shelter(&self, shelter_id: UserId) -> Result<Vec<Pet>, RepositoryError>;
    /// Removes the pet with its images, favorites, applications and notifications.
    fn delete_pet(&self, id: PetId) -> Result<Pet, RepositoryError>;

    /// A primary image clears the primary flag on the pet's other images.
    fn insert_image(&self, image: PetImage) -> Result<PetImage, RepositoryError>;
    fn images(&self, pet_id: PetId) -> Result<Vec<PetImage>, RepositoryError>;

    /// Creates the favorite when missing and deletes it otherwise; returns the new state.
    fn toggle_favorite(
        &self,
        user_id: UserId,
        pet_id: PetId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
    fn is_favorite(&self, user_id: UserId, pet_id: PetId) -> Result<bool, RepositoryError>;
    /// Newest favorite first.
    fn favorites_of(&self, user_id: UserId) -> Result<Vec<PetFavorite>, RepositoryError>;
    fn favorited_by(&self, pet_id: PetId) -> Result<Vec<UserId>, RepositoryError>;
}
