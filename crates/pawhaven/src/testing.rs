//! Fixtures shared by the module test suites.

use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::access::Actor;
use crate::accounts::{Registration, Role, ShelterProfileInput};
use crate::adoptions::{ApplicationForm, ApplicationSubmission, QuickRequestForm};
use crate::config::EmailConfig;
use crate::http::PageLimits;
use crate::notifications::{EmailError, EmailMessage, Mailer};
use crate::pets::{Gender, Pet, PetAttributes, PetId, PetSize, Species};
use crate::platform::Platform;
use crate::store::RecordStore;

#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().expect("mailer mutex poisoned").push(message.clone());
        Ok(())
    }
}

impl RecordingMailer {
    pub(crate) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

pub(crate) struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _message: &EmailMessage) -> Result<(), EmailError> {
        Err(EmailError::Transport("smtp relay offline".to_string()))
    }
}

pub(crate) type TestPlatform = Platform<RecordStore, RecordingMailer>;

pub(crate) fn platform() -> (TestPlatform, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let platform = Platform::new(
        Arc::new(RecordStore::new()),
        mailer.clone(),
        EmailConfig::default(),
        PageLimits::default(),
    );
    (platform, mailer)
}

pub(crate) fn registration(username: &str, role: Role) -> Registration {
    Registration {
        username: username.to_string(),
        email: format!("{username}@example.org"),
        first_name: capitalize(username),
        last_name: "Tester".to_string(),
        role,
        phone_number: "+15155550100".to_string(),
        password: "correct-horse".to_string(),
        password_confirm: "correct-horse".to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn register<M: Mailer + 'static>(
    platform: &Platform<RecordStore, M>,
    username: &str,
    role: Role,
) -> Actor {
    let session = match role {
        Role::Admin => platform
            .accounts
            .create_administrator(registration(username, role)),
        _ => platform.accounts.register(registration(username, role)),
    }
    .expect("registers");
    platform
        .accounts
        .authenticate(&session.token)
        .expect("token resolves")
}

/// A shelter account with an organization profile.
pub(crate) fn shelter<M: Mailer + 'static>(
    platform: &Platform<RecordStore, M>,
    username: &str,
) -> Actor {
    let actor = register(platform, username, Role::Shelter);
    platform
        .accounts
        .setup_shelter_profile(
            &actor,
            ShelterProfileInput {
                organization_name: format!("{} Rescue", capitalize(username)),
                license_number: format!("LIC-{username}"),
                website: String::new(),
                description: "Community shelter".to_string(),
                capacity: 40,
                established_date: chrono::NaiveDate::from_ymd_opt(2012, 4, 1)
                    .expect("valid date"),
            },
        )
        .expect("shelter profile");
    actor
}

pub(crate) fn attributes(name: &str, species: Species) -> PetAttributes {
    PetAttributes {
        name: name.to_string(),
        species,
        breed: "Mixed".to_string(),
        age_years: 2,
        age_months: 3,
        gender: Gender::Female,
        size: PetSize::Medium,
        weight: Some(21.5),
        color: "Brown".to_string(),
        description: "Gentle and curious".to_string(),
        personality_traits: "Calm".to_string(),
        good_with_kids: true,
        good_with_dogs: true,
        good_with_cats: false,
        house_trained: true,
        is_spayed_neutered: true,
        is_vaccinated: true,
        medical_notes: String::new(),
        special_needs: String::new(),
        adoption_fee: 15_000,
    }
}

pub(crate) fn list_pet<M: Mailer + 'static>(
    platform: &Platform<RecordStore, M>,
    shelter: &Actor,
    name: &str,
) -> Pet {
    platform
        .pets
        .create(shelter, attributes(name, Species::Dog))
        .expect("pet created")
}

pub(crate) fn application_form() -> ApplicationForm {
    ApplicationForm {
        reason_for_adoption: "Looking for a running partner".to_string(),
        experience_with_pets: "Two dogs over ten years".to_string(),
        living_situation: "House with a fenced yard".to_string(),
        work_schedule: "Hybrid, home three days a week".to_string(),
        emergency_contact_name: "Jordan Tester".to_string(),
        emergency_contact_phone: "+15155550111".to_string(),
        emergency_contact_relationship: "Sibling".to_string(),
        ..ApplicationForm::default()
    }
}

pub(crate) fn submission(pet_id: PetId) -> ApplicationSubmission {
    ApplicationSubmission {
        pet_id,
        form: application_form(),
    }
}

pub(crate) fn quick_request() -> QuickRequestForm {
    QuickRequestForm {
        message: "Could we meet this weekend?".to_string(),
        phone_number: "+15155550122".to_string(),
        preferred_contact_time: "Evenings".to_string(),
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
