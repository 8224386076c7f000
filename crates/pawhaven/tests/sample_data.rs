use std::io::Cursor;
use std::sync::Arc;

use pawhaven::accounts::{LoginRequest, Role, UserRepository};
use pawhaven::adoptions::{ApplicationScope, ApplicationRepository, ApplicationStatus};
use pawhaven::catalog::{
    import_catalog, seed_sample_data, CatalogImportError, CatalogImporter, SAMPLE_PETS_CSV,
};
use pawhaven::config::EmailConfig;
use pawhaven::http::PageLimits;
use pawhaven::notifications::TracingMailer;
use pawhaven::pets::{PetRepository, PetStatus, Species};
use pawhaven::store::RecordStore;
use pawhaven::Platform;

fn platform() -> Platform<RecordStore, TracingMailer> {
    Platform::new(
        Arc::new(RecordStore::new()),
        Arc::new(TracingMailer),
        EmailConfig::default(),
        PageLimits::default(),
    )
}

#[test]
fn seeding_loads_accounts_pets_and_applications_once() {
    let platform = platform();

    let summary = seed_sample_data(&platform).expect("seed runs");
    assert!(!summary.skipped);
    assert_eq!(summary.users, 5);
    assert_eq!(summary.pets, 5);
    assert_eq!(summary.applications, 2);

    assert_eq!(platform.store.count_users(Role::Shelter).expect("count"), 2);
    assert_eq!(platform.store.count_users(Role::Adopter).expect("count"), 2);

    let pets = platform.store.pets().expect("pets");
    let luna = pets
        .iter()
        .find(|pet| pet.name() == "Luna")
        .expect("Luna imported");
    assert_eq!(luna.attributes.species, Species::Cat);
    assert_eq!(luna.attributes.adoption_fee, 15_000);
    assert_eq!(luna.status, PetStatus::Pending);

    let applications = platform
        .store
        .applications(ApplicationScope::All)
        .expect("applications");
    let statuses: Vec<_> = applications
        .iter()
        .map(|application| application.status)
        .collect();
    assert!(statuses.contains(&ApplicationStatus::Pending));
    assert!(statuses.contains(&ApplicationStatus::Approved));

    let session = platform
        .accounts
        .login(LoginRequest {
            username: "john_doe".to_string(),
            password: "adopter123".to_string(),
        })
        .expect("seeded adopter can sign in");
    assert_eq!(session.user.city, "Suburb City");

    let again = seed_sample_data(&platform).expect("second seed runs");
    assert!(again.skipped);
    assert_eq!(platform.store.pets().expect("pets").len(), 5);
}

#[test]
fn import_rejects_rows_for_unknown_or_non_shelter_accounts() {
    let platform = platform();
    seed_sample_data(&platform).expect("seed runs");

    let header = SAMPLE_PETS_CSV.lines().next().expect("header row");
    let csv = format!(
        "{header}\nnowhere_shelter,Ghost,cat,Tabby,1,0,female,small,,Grey,,,true,true,true,true,true,true,,,50\n"
    );
    let entries = CatalogImporter::from_reader(Cursor::new(csv)).expect("row parses");
    let err = import_catalog(&platform, entries).expect_err("unknown shelter");
    assert!(matches!(
        err,
        CatalogImportError::UnknownShelter { ref username } if username == "nowhere_shelter"
    ));

    let csv = format!(
        "{header}\njohn_doe,Ghost,cat,Tabby,1,0,female,small,,Grey,,,true,true,true,true,true,true,,,50\n"
    );
    let entries = CatalogImporter::from_reader(Cursor::new(csv)).expect("row parses");
    let err = import_catalog(&platform, entries).expect_err("adopters cannot own pets");
    assert!(matches!(err, CatalogImportError::UnknownShelter { .. }));

    let csv = format!(
        "{header}\nrescue_haven,Pip,rabbit,Lop,0,4,male,small,2.1,White,Soft,Shy,true,false,false,false,false,true,,,$40\n"
    );
    let entries = CatalogImporter::from_reader(Cursor::new(csv)).expect("row parses");
    let imported = import_catalog(&platform, entries).expect("imports");
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].attributes.adoption_fee, 4_000);
    let owner = platform
        .store
        .user_by_username("rescue_haven")
        .expect("store readable")
        .expect("shelter exists");
    assert_eq!(imported[0].shelter_id, owner.id);
}

#[test]
fn malformed_catalog_rows_surface_as_csv_errors() {
    let err = CatalogImporter::from_reader(Cursor::new(
        "shelter,name,species\nrescue_haven,Pip,dragon\n",
    ))
    .expect_err("unknown species");
    assert!(matches!(err, CatalogImportError::Csv(_)));
}
