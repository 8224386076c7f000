use super::domain::{AdopterProfile, AuthToken, Role, ShelterProfile, User, UserId};
use crate::store::RepositoryError;

/// Storage abstraction for accounts, API tokens and onboarding profiles.
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<(), RepositoryError>;
    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    fn count_users(&self, role: Role) -> Result<usize, RepositoryError>;
    /// Newest account first.
    fn recent_users(&self, limit: usize) -> Result<Vec<User>, RepositoryError>;
    fn total_users(&self) -> Result<usize, RepositoryError>;

    fn insert_token(&self, token: AuthToken, user_id: UserId) -> Result<(), RepositoryError>;
    fn token_for_user(&self, user_id: UserId) -> Result<Option<AuthToken>, RepositoryError>;
    fn user_for_token(&self, token: &AuthToken) -> Result<Option<User>, RepositoryError>;

    /// Fails with `Conflict` when the user already has a profile or the license is registered.
    fn insert_shelter_profile(
        &self,
        profile: ShelterProfile,
    ) -> Result<ShelterProfile, RepositoryError>;
    fn shelter_profile(&self, user_id: UserId) -> Result<Option<ShelterProfile>, RepositoryError>;
    fn insert_adopter_profile(
        &self,
        profile: AdopterProfile,
    ) -> Result<AdopterProfile, RepositoryError>;
    fn adopter_profile(&self, user_id: UserId) -> Result<Option<AdopterProfile>, RepositoryError>;
}
