//! Pet catalog: listings owned by shelters, images, browsing filters and favorites.

pub mod domain;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;


pub use domain::{
    age_display, main_image, FavoriteToggle, Gender, Pet, PetAttributes, PetDetail, PetFavorite,
    PetId, PetImage, PetImageId, PetImageUpload, PetSize, PetStatus, PetSummary, PetUpdate,
    Species,
};
pub use repository::PetRepository;
pub use router::pet_router;
pub use search::{OrderField, PetOrdering, PetQuery, SearchFilters};
pub use service::{PetError, PetService};
