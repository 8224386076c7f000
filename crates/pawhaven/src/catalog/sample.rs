use std::io::Cursor;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::{import_catalog, CatalogImportError, CatalogImporter};
use crate::access::Actor;
use crate::accounts::{
    AdopterProfileInput, HousingType, ProfileUpdate, Registration, Role, ShelterProfileInput,
};
use crate::adoptions::{ApplicationForm, ApplicationSubmission};
use crate::notifications::Mailer;
use crate::pets::Pet;
use crate::platform::Platform;
use crate::store::PlatformStore;

/// Pets loaded by [`seed_sample_data`].
pub const SAMPLE_PETS_CSV: &str = include_str!("../../data/sample_pets.csv");

/// What a seeding run created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// True when shelters already existed and nothing was written.
    pub skipped: bool,
    pub users: usize,
    pub pets: usize,
    pub applications: usize,
}

struct SampleAccount {
    username: &'static str,
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    role: Role,
    phone_number: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    zip_code: &'static str,
}

const ACCOUNTS: &[SampleAccount] = &[
    SampleAccount {
        username: "admin",
        email: "admin@pawhaven.local",
        password: "admin123",
        first_name: "Platform",
        last_name: "Admin",
        role: Role::Admin,
        phone_number: "",
        address: "",
        city: "",
        state: "",
        zip_code: "",
    },
    SampleAccount {
        username: "happypaws_shelter",
        email: "contact@happypaws.com",
        password: "shelter123",
        first_name: "Happy",
        last_name: "Paws",
        role: Role::Shelter,
        phone_number: "+1234567890",
        address: "123 Animal Street",
        city: "Pet City",
        state: "CA",
        zip_code: "12345",
    },
    SampleAccount {
        username: "rescue_haven",
        email: "info@rescuehaven.org",
        password: "shelter123",
        first_name: "Rescue",
        last_name: "Haven",
        role: Role::Shelter,
        phone_number: "+1234567891",
        address: "456 Rescue Road",
        city: "Animal Town",
        state: "NY",
        zip_code: "54321",
    },
    SampleAccount {
        username: "john_doe",
        email: "john@example.com",
        password: "adopter123",
        first_name: "John",
        last_name: "Doe",
        role: Role::Adopter,
        phone_number: "+1234567892",
        address: "789 Family Lane",
        city: "Suburb City",
        state: "CA",
        zip_code: "67890",
    },
    SampleAccount {
        username: "sarah_smith",
        email: "sarah@example.com",
        password: "adopter123",
        first_name: "Sarah",
        last_name: "Smith",
        role: Role::Adopter,
        phone_number: "+1234567893",
        address: "321 Apartment Ave",
        city: "Metro City",
        state: "NY",
        zip_code: "13579",
    },
];

/// Loads the bundled shelters, adopters, pets and two applications.
///
/// Does nothing when any shelter account already exists.
pub fn seed_sample_data<S, M>(platform: &Platform<S, M>) -> Result<SeedSummary, CatalogImportError>
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    if platform.store.count_users(Role::Shelter)? > 0 {
        info!("sample data already present, skipping seed");
        return Ok(SeedSummary {
            skipped: true,
            ..SeedSummary::default()
        });
    }

    let mut actors = Vec::with_capacity(ACCOUNTS.len());
    for account in ACCOUNTS {
        let registration = Registration {
            username: account.username.to_string(),
            email: account.email.to_string(),
            first_name: account.first_name.to_string(),
            last_name: account.last_name.to_string(),
            role: account.role,
            phone_number: account.phone_number.to_string(),
            password: account.password.to_string(),
            password_confirm: account.password.to_string(),
        };
        let session = match account.role {
            Role::Admin => platform.accounts.create_administrator(registration)?,
            _ => platform.accounts.register(registration)?,
        };
        let actor = platform.accounts.authenticate(&session.token)?;
        platform.accounts.update_profile(
            &actor,
            ProfileUpdate {
                address: Some(account.address.to_string()),
                city: Some(account.city.to_string()),
                state: Some(account.state.to_string()),
                zip_code: Some(account.zip_code.to_string()),
                ..ProfileUpdate::default()
            },
        )?;
        actors.push((account.username, actor));
    }
    let actor = |username: &str| {
        actors
            .iter()
            .find(|(name, _)| *name == username)
            .map(|(_, actor)| *actor)
            .ok_or_else(|| CatalogImportError::UnknownShelter {
                username: username.to_string(),
            })
    };

    setup_profiles(platform, &actor("happypaws_shelter")?, &actor("rescue_haven")?)?;
    setup_adopters(platform, &actor("john_doe")?, &actor("sarah_smith")?)?;

    let entries = CatalogImporter::from_reader(Cursor::new(SAMPLE_PETS_CSV))?;
    let pets = import_catalog(platform, entries)?;

    let applications = seed_applications(
        platform,
        &pets,
        &actor("john_doe")?,
        &actor("sarah_smith")?,
        &actor("happypaws_shelter")?,
    )?;

    let summary = SeedSummary {
        skipped: false,
        users: actors.len(),
        pets: pets.len(),
        applications,
    };
    info!(
        users = summary.users,
        pets = summary.pets,
        applications = summary.applications,
        "sample data seeded"
    );
    Ok(summary)
}

fn setup_profiles<S, M>(
    platform: &Platform<S, M>,
    happy_paws: &Actor,
    rescue_haven: &Actor,
) -> Result<(), CatalogImportError>
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    platform.accounts.setup_shelter_profile(
        happy_paws,
        ShelterProfileInput {
            organization_name: "Happy Paws Animal Shelter".to_string(),
            license_number: "SHELTER001".to_string(),
            website: "https://happypaws.com".to_string(),
            description: "A loving shelter dedicated to finding homes for abandoned animals."
                .to_string(),
            capacity: 50,
            established_date: date(2010, 1, 1),
        },
    )?;
    platform.accounts.setup_shelter_profile(
        rescue_haven,
        ShelterProfileInput {
            organization_name: "Rescue Haven".to_string(),
            license_number: "SHELTER002".to_string(),
            website: "https://rescuehaven.org".to_string(),
            description: "Specialized in rescuing and rehabilitating stray animals.".to_string(),
            capacity: 30,
            established_date: date(2015, 6, 15),
        },
    )?;
    Ok(())
}

fn setup_adopters<S, M>(
    platform: &Platform<S, M>,
    john: &Actor,
    sarah: &Actor,
) -> Result<(), CatalogImportError>
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    platform.accounts.setup_adopter_profile(
        john,
        AdopterProfileInput {
            housing_type: HousingType::House,
            has_yard: true,
            has_other_pets: false,
            other_pets_description: String::new(),
            household_members: 3,
            experience_with_pets: "I grew up with dogs and have had pets for over 10 years."
                .to_string(),
            preferred_pet_age: "Young adult".to_string(),
            preferred_pet_size: "Medium".to_string(),
        },
    )?;
    platform.accounts.setup_adopter_profile(
        sarah,
        AdopterProfileInput {
            housing_type: HousingType::Apartment,
            has_yard: false,
            has_other_pets: true,
            other_pets_description: "One cat named Whiskers".to_string(),
            household_members: 2,
            experience_with_pets: "I have experience with both cats and small dogs.".to_string(),
            preferred_pet_age: "Any age".to_string(),
            preferred_pet_size: "Small to medium".to_string(),
        },
    )?;
    Ok(())
}

fn seed_applications<S, M>(
    platform: &Platform<S, M>,
    pets: &[Pet],
    john: &Actor,
    sarah: &Actor,
    happy_paws: &Actor,
) -> Result<usize, CatalogImportError>
where
    S: PlatformStore + 'static,
    M: Mailer + 'static,
{
    let mut created = 0;

    if let Some(buddy) = pets.iter().find(|pet| pet.name() == "Buddy") {
        platform.adoptions.submit_application(
            john,
            ApplicationSubmission {
                pet_id: buddy.id,
                form: ApplicationForm {
                    reason_for_adoption: "I want to provide a loving home for a dog and have \
                                          experience with Golden Retrievers."
                        .to_string(),
                    experience_with_pets: "I grew up with dogs and have had pets for over 10 \
                                           years."
                        .to_string(),
                    living_situation: "I live in a house with a large fenced yard.".to_string(),
                    work_schedule: "I work from home 3 days a week.".to_string(),
                    emergency_contact_name: "Jane Doe".to_string(),
                    emergency_contact_phone: "+1234567894".to_string(),
                    emergency_contact_relationship: "Sister".to_string(),
                    veterinarian_name: "Dr. Smith Animal Clinic".to_string(),
                    veterinarian_phone: "+1234567895".to_string(),
                    veterinarian_address: "123 Vet Street, Suburb City, CA".to_string(),
                    additional_notes: "We are excited to welcome Buddy into our family."
                        .to_string(),
                },
            },
        )?;
        created += 1;
    }

    if let Some(luna) = pets.iter().find(|pet| pet.name() == "Luna") {
        let view = platform.adoptions.submit_application(
            sarah,
            ApplicationSubmission {
                pet_id: luna.id,
                form: ApplicationForm {
                    reason_for_adoption: "I am looking for a companion cat for my current cat."
                        .to_string(),
                    experience_with_pets: "I have experience with both cats and small dogs."
                        .to_string(),
                    living_situation: "I live in a pet-friendly apartment with my partner."
                        .to_string(),
                    work_schedule: "We both work regular hours and have a pet sitter."
                        .to_string(),
                    emergency_contact_name: "Mike Johnson".to_string(),
                    emergency_contact_phone: "+1234567896".to_string(),
                    emergency_contact_relationship: "Brother".to_string(),
                    veterinarian_name: "City Animal Hospital".to_string(),
                    veterinarian_phone: "+1234567897".to_string(),
                    veterinarian_address: "456 Pet Ave, Metro City, NY".to_string(),
                    additional_notes: String::new(),
                },
            },
        )?;
        platform
            .adoptions
            .approve(happy_paws, view.application.id, None)?;
        created += 1;
    }

    Ok(created)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
