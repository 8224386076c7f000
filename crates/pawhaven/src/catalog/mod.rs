//! Bulk pet import from CSV and the bundled sample data set.

mod parser;
mod sample;

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::access::Actor;
use crate::accounts::{AccountError, Role};
use crate::adoptions::AdoptionError;
use crate::notifications::Mailer;
use crate::pets::{Pet, PetError};
use crate::platform::Platform;
use crate::store::{PlatformStore, RepositoryError};

pub use parser::CatalogEntry;
pub use sample::{seed_sample_data, SeedSummary, SAMPLE_PETS_CSV};

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read pet catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pet catalog CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog names '{username}', which is not a shelter account")]
    UnknownShelter { username: String },
    #[error("could not create sample account: {0}")]
    Account(#[from] AccountError),
    #[error("could not create catalog pet: {0}")]
    Pet(#[from] PetError),
    #[error("could not create sample application: {0}")]
    Adoption(#[from] AdoptionError),
    #[error("catalog store error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CatalogEntry>, CatalogImportError> {
        Ok(parser::parse_entries(reader)?)
    }
}

/// Creates every entry as a pet owned by the named shelter account.
///
/// Stops at the first entry whose shelter is unknown or whose fields fail validation; pets
/// created before that point stay.
pub fn import_catalog<S, M>(
    platform: &Platform<S, M>,
    entries: Vec<CatalogEntry>,
) -> Result<Vec<Pet>, CatalogImportError>
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    let mut created = Vec::with_capacity(entries.len());
    for entry in entries {
        let shelter = platform
            .store
            .user_by_username(&entry.shelter)?
            .filter(|user| user.role == Role::Shelter)
            .ok_or_else(|| CatalogImportError::UnknownShelter {
                username: entry.shelter.clone(),
            })?;

        let pet = platform
            .pets
            .create(&Actor::from(&shelter), entry.attributes)?;
        created.push(pet);
    }

    info!(pets = created.len(), "pet catalog imported");
    Ok(created)
}
