//! User accounts, API tokens and the shelter/adopter onboarding profiles.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    AccountOverview, AdopterProfile, AdopterProfileInput, AuthSession, AuthToken, Credentials,
    HousingType, LoginRequest, ProfileUpdate, Registration, Role, ShelterProfile,
    ShelterProfileInput, User, UserId, UserProfileView,
};
pub use repository::UserRepository;
pub use router::{account_router, authenticate};
pub use service::{AccountError, AccountService};
