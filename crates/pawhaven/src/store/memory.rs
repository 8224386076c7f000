use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::accounts::{
    AdopterProfile, AuthToken, Role, ShelterProfile, User, UserId, UserRepository,
};
use crate::adoptions::{
    AdoptionApplication, AdoptionDocument, AdoptionInterview, ApplicationId, ApplicationKind,
    ApplicationRepository, ApplicationScope, ApplicationStatus, DocumentId, InterviewId,
    PetEffect, TransitionReceipt, TransitionWrite,
};
use crate::notifications::{Notification, NotificationId, NotificationRepository};
use crate::pets::{
    Pet, PetFavorite, PetId, PetImage, PetImageId, PetRepository, PetStatus, PetUpdate,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    tokens: HashMap<AuthToken, UserId>,
    shelter_profiles: BTreeMap<UserId, ShelterProfile>,
    adopter_profiles: BTreeMap<UserId, AdopterProfile>,
    pets: BTreeMap<PetId, Pet>,
    images: BTreeMap<PetImageId, PetImage>,
    favorites: BTreeMap<(UserId, PetId), PetFavorite>,
    applications: BTreeMap<ApplicationId, AdoptionApplication>,
    interviews: BTreeMap<InterviewId, AdoptionInterview>,
    documents: BTreeMap<DocumentId, AdoptionDocument>,
    notifications: BTreeMap<NotificationId, Notification>,
}

impl Tables {
    fn require_user(&self, id: UserId) -> Result<(), RepositoryError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::MissingReference { entity: "user" })
        }
    }

    fn require_pet(&self, id: PetId) -> Result<(), RepositoryError> {
        if self.pets.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::MissingReference { entity: "pet" })
        }
    }

    fn require_application(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        if self.applications.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::MissingReference {
                entity: "application",
            })
        }
    }
}

/// In-memory relational store. Clones share the same tables.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    tables: Arc<Mutex<Tables>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store mutex poisoned".to_string()))
    }
}

fn newest_first<T, K: Ord>(mut records: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    records.sort_by(|a, b| key(b).cmp(&key(a)));
    records
}

impl UserRepository for RecordStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.users.contains_key(&user.id)
            || tables
                .users
                .values()
                .any(|existing| existing.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(RepositoryError::Conflict {
                constraint: "users.username",
            });
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .values()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    fn count_users(&self, role: Role) -> Result<usize, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables.users.values().filter(|user| user.role == role).count())
    }

    fn recent_users(&self, limit: usize) -> Result<Vec<User>, RepositoryError> {
        let tables = self.tables()?;
        let mut users = newest_first(tables.users.values().cloned().collect(), |user| {
            (user.created_at, user.id)
        });
        users.truncate(limit);
        Ok(users)
    }

    fn total_users(&self) -> Result<usize, RepositoryError> {
        Ok(self.tables()?.users.len())
    }

    fn insert_token(&self, token: AuthToken, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_user(user_id)?;
        if tables.tokens.contains_key(&token) {
            return Err(RepositoryError::Conflict {
                constraint: "tokens.key",
            });
        }
        tables.tokens.insert(token, user_id);
        Ok(())
    }

    fn token_for_user(&self, user_id: UserId) -> Result<Option<AuthToken>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .tokens
            .iter()
            .find(|(_, owner)| **owner == user_id)
            .map(|(token, _)| token.clone()))
    }

    fn user_for_token(&self, token: &AuthToken) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .tokens
            .get(token)
            .and_then(|user_id| tables.users.get(user_id))
            .cloned())
    }

    fn insert_shelter_profile(
        &self,
        profile: ShelterProfile,
    ) -> Result<ShelterProfile, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_user(profile.user_id)?;
        if tables.shelter_profiles.contains_key(&profile.user_id) {
            return Err(RepositoryError::Conflict {
                constraint: "shelter_profiles.user",
            });
        }
        if tables
            .shelter_profiles
            .values()
            .any(|existing| existing.license_number == profile.license_number)
        {
            return Err(RepositoryError::Conflict {
                constraint: "shelter_profiles.license_number",
            });
        }
        tables
            .shelter_profiles
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    fn shelter_profile(&self, user_id: UserId) -> Result<Option<ShelterProfile>, RepositoryError> {
        Ok(self.tables()?.shelter_profiles.get(&user_id).cloned())
    }

    fn insert_adopter_profile(
        &self,
        profile: AdopterProfile,
    ) -> Result<AdopterProfile, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_user(profile.user_id)?;
        if tables.adopter_profiles.contains_key(&profile.user_id) {
            return Err(RepositoryError::Conflict {
                constraint: "adopter_profiles.user",
            });
        }
        tables
            .adopter_profiles
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    fn adopter_profile(&self, user_id: UserId) -> Result<Option<AdopterProfile>, RepositoryError> {
        Ok(self.tables()?.adopter_profiles.get(&user_id).cloned())
    }
}

impl PetRepository for RecordStore {
    fn insert_pet(&self, pet: Pet) -> Result<Pet, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_user(pet.shelter_id)?;
        if tables.pets.contains_key(&pet.id) {
            return Err(RepositoryError::Conflict {
                constraint: "pets.id",
            });
        }
        tables.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }

    fn update_pet(
        &self,
        id: PetId,
        changes: PetUpdate,
        at: DateTime<Utc>,
    ) -> Result<Pet, RepositoryError> {
        let mut tables = self.tables()?;
        let pet = tables.pets.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(status) = changes.status {
            pet.status = status;
        }
        changes.apply(&mut pet.attributes);
        pet.updated_at = at;
        Ok(pet.clone())
    }

    fn pet(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(self.tables()?.pets.get(&id).cloned())
    }

    fn pets(&self) -> Result<Vec<Pet>, RepositoryError> {
        Ok(self.tables()?.pets.values().cloned().collect())
    }

    fn pets_by_shelter(&self, shelter_id: UserId) -> Result<Vec<Pet>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .pets
            .values()
            .filter(|pet| pet.shelter_id == shelter_id)
            .cloned()
            .collect())
    }

    fn delete_pet(&self, id: PetId) -> Result<Pet, RepositoryError> {
        let mut guard = self.tables()?;
        let tables = &mut *guard;
        let pet = tables.pets.remove(&id).ok_or(RepositoryError::NotFound)?;

        tables.images.retain(|_, image| image.pet_id != id);
        tables.favorites.retain(|(_, pet_id), _| *pet_id != id);

        let removed: BTreeSet<ApplicationId> = tables
            .applications
            .values()
            .filter(|application| application.pet_id == id)
            .map(|application| application.id)
            .collect();
        tables
            .applications
            .retain(|application_id, _| !removed.contains(application_id));
        tables
            .interviews
            .retain(|_, interview| !removed.contains(&interview.application_id));
        tables
            .documents
            .retain(|_, document| !removed.contains(&document.application_id));
        tables.notifications.retain(|_, notification| {
            notification.pet_id != Some(id)
                && notification
                    .application_id
                    .map_or(true, |application_id| !removed.contains(&application_id))
        });

        Ok(pet)
    }

    fn insert_image(&self, image: PetImage) -> Result<PetImage, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_pet(image.pet_id)?;
        if image.is_primary {
            for sibling in tables
                .images
                .values_mut()
                .filter(|sibling| sibling.pet_id == image.pet_id)
            {
                sibling.is_primary = false;
            }
        }
        tables.images.insert(image.id, image.clone());
        Ok(image)
    }

    fn images(&self, pet_id: PetId) -> Result<Vec<PetImage>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .images
            .values()
            .filter(|image| image.pet_id == pet_id)
            .cloned()
            .collect())
    }

    fn toggle_favorite(
        &self,
        user_id: UserId,
        pet_id: PetId,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_user(user_id)?;
        tables.require_pet(pet_id)?;
        let key = (user_id, pet_id);
        if tables.favorites.remove(&key).is_some() {
            return Ok(false);
        }
        tables.favorites.insert(
            key,
            PetFavorite {
                user_id,
                pet_id,
                created_at: at,
            },
        );
        Ok(true)
    }

    fn is_favorite(&self, user_id: UserId, pet_id: PetId) -> Result<bool, RepositoryError> {
        Ok(self.tables()?.favorites.contains_key(&(user_id, pet_id)))
    }

    fn favorites_of(&self, user_id: UserId) -> Result<Vec<PetFavorite>, RepositoryError> {
        let tables = self.tables()?;
        let favorites = tables
            .favorites
            .values()
            .filter(|favorite| favorite.user_id == user_id)
            .copied()
            .collect();
        Ok(newest_first(favorites, |favorite| {
            (favorite.created_at, favorite.pet_id)
        }))
    }

    fn favorited_by(&self, pet_id: PetId) -> Result<Vec<UserId>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .favorites
            .keys()
            .filter(|(_, favorite_pet)| *favorite_pet == pet_id)
            .map(|(user_id, _)| *user_id)
            .collect())
    }
}

impl ApplicationRepository for RecordStore {
    fn insert_application(
        &self,
        application: AdoptionApplication,
    ) -> Result<AdoptionApplication, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_user(application.applicant_id)?;
        tables.require_pet(application.pet_id)?;
        let kind = application.kind();
        let duplicate = tables.applications.values().any(|existing| {
            existing.id == application.id
                || (existing.applicant_id == application.applicant_id
                    && existing.pet_id == application.pet_id
                    && existing.kind() == kind)
        });
        if duplicate {
            return Err(RepositoryError::Conflict {
                constraint: "applications.applicant_pet_kind",
            });
        }
        tables
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    fn application(
        &self,
        id: ApplicationId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Ok(self.tables()?.applications.get(&id).cloned())
    }

    fn find_application(
        &self,
        applicant_id: UserId,
        pet_id: PetId,
        kind: ApplicationKind,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .applications
            .values()
            .find(|application| {
                application.applicant_id == applicant_id
                    && application.pet_id == pet_id
                    && application.kind() == kind
            })
            .cloned())
    }

    fn applications(
        &self,
        scope: ApplicationScope,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        let tables = self.tables()?;
        let matches = |application: &AdoptionApplication| match scope {
            ApplicationScope::Applicant(user_id) => application.applicant_id == user_id,
            ApplicationScope::Shelter(shelter_id) => tables
                .pets
                .get(&application.pet_id)
                .map_or(false, |pet| pet.shelter_id == shelter_id),
            ApplicationScope::All => true,
        };
        let applications = tables
            .applications
            .values()
            .filter(|application| matches(application))
            .cloned()
            .collect();
        Ok(newest_first(applications, |application| {
            (application.submitted_at, application.id)
        }))
    }

    fn applications_for_pet(
        &self,
        pet_id: PetId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .applications
            .values()
            .filter(|application| application.pet_id == pet_id)
            .cloned()
            .collect())
    }

    fn apply_transition(
        &self,
        write: TransitionWrite,
    ) -> Result<TransitionReceipt, RepositoryError> {
        let mut guard = self.tables()?;
        let tables = &mut *guard;

        let current = tables
            .applications
            .get(&write.application_id)
            .ok_or(RepositoryError::NotFound)?;
        if current.status != write.expected {
            return Err(RepositoryError::StatusMismatch {
                expected: write.expected,
                actual: current.status,
            });
        }
        let pet_id = current.pet_id;
        let pet_status = tables
            .pets
            .get(&pet_id)
            .map(|pet| pet.status)
            .ok_or(RepositoryError::MissingReference { entity: "pet" })?;
        let sibling_in = |status: ApplicationStatus| {
            tables.applications.values().any(|other| {
                other.pet_id == pet_id && other.id != write.application_id && other.status == status
            })
        };

        let next_pet_status = match write.pet_effect {
            PetEffect::Hold | PetEffect::Adopt if pet_status == PetStatus::Adopted => {
                return Err(RepositoryError::PetUnavailable { status: pet_status });
            }
            PetEffect::Adopt if sibling_in(ApplicationStatus::Completed) => {
                return Err(RepositoryError::PetUnavailable {
                    status: PetStatus::Adopted,
                });
            }
            PetEffect::Hold => Some(PetStatus::Pending),
            PetEffect::Adopt => Some(PetStatus::Adopted),
            PetEffect::ReleaseIfUnheld
                if pet_status == PetStatus::Pending && !sibling_in(ApplicationStatus::Approved) =>
            {
                Some(PetStatus::Available)
            }
            PetEffect::ReleaseIfUnheld | PetEffect::Unchanged => None,
        };

        let stamp = write
            .completed_at
            .or(write.reviewed_at)
            .unwrap_or_else(Utc::now);
        let pet = tables
            .pets
            .get_mut(&pet_id)
            .ok_or(RepositoryError::MissingReference { entity: "pet" })?;
        if let Some(status) = next_pet_status {
            pet.status = status;
            pet.updated_at = stamp;
        }
        let pet = pet.clone();

        let application = tables
            .applications
            .get_mut(&write.application_id)
            .ok_or(RepositoryError::NotFound)?;
        application.status = write.next;
        if write.reviewed_at.is_some() {
            application.reviewed_at = write.reviewed_at;
        }
        if write.completed_at.is_some() {
            application.completed_at = write.completed_at;
        }
        if let Some(notes) = write.reviewer_notes {
            application.reviewer_notes = notes;
        }

        Ok(TransitionReceipt {
            application: application.clone(),
            pet,
        })
    }

    fn insert_interview(
        &self,
        interview: AdoptionInterview,
    ) -> Result<AdoptionInterview, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_application(interview.application_id)?;
        tables.require_user(interview.interviewer_id)?;
        tables.interviews.insert(interview.id, interview.clone());
        Ok(interview)
    }

    fn interviews(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<AdoptionInterview>, RepositoryError> {
        let tables = self.tables()?;
        let interviews = tables
            .interviews
            .values()
            .filter(|interview| interview.application_id == application_id)
            .cloned()
            .collect();
        Ok(newest_first(interviews, |interview| {
            (interview.scheduled_date, interview.id)
        }))
    }

    fn insert_document(
        &self,
        document: AdoptionDocument,
    ) -> Result<AdoptionDocument, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_application(document.application_id)?;
        tables.require_user(document.uploaded_by)?;
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    fn documents(
        &self,
        application_id: ApplicationId,
    ) -> Result<Vec<AdoptionDocument>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .documents
            .values()
            .filter(|document| document.application_id == application_id)
            .cloned()
            .collect())
    }
}

impl NotificationRepository for RecordStore {
    fn insert_notification(
        &self,
        notification: Notification,
    ) -> Result<Notification, RepositoryError> {
        let mut tables = self.tables()?;
        tables.require_user(notification.recipient_id)?;
        tables
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    fn notifications_for(
        &self,
        recipient_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let tables = self.tables()?;
        let notifications = tables
            .notifications
            .values()
            .filter(|notification| notification.recipient_id == recipient_id)
            .cloned()
            .collect();
        let mut notifications = newest_first(notifications, |notification| {
            (notification.created_at, notification.id)
        });
        if let Some(limit) = limit {
            notifications.truncate(limit);
        }
        Ok(notifications)
    }

    fn unread_count(&self, recipient_id: UserId) -> Result<usize, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .notifications
            .values()
            .filter(|notification| notification.recipient_id == recipient_id && !notification.is_read)
            .count())
    }

    fn mark_read(
        &self,
        recipient_id: UserId,
        id: NotificationId,
        at: DateTime<Utc>,
    ) -> Result<Notification, RepositoryError> {
        let mut tables = self.tables()?;
        let notification = tables
            .notifications
            .get_mut(&id)
            .filter(|notification| notification.recipient_id == recipient_id)
            .ok_or(RepositoryError::NotFound)?;
        if !notification.is_read {
            notification.is_read = true;
            notification.read_at = Some(at);
        }
        Ok(notification.clone())
    }

    fn mark_all_read(
        &self,
        recipient_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        let mut tables = self.tables()?;
        let mut flipped = 0;
        for notification in tables
            .notifications
            .values_mut()
            .filter(|notification| notification.recipient_id == recipient_id && !notification.is_read)
        {
            notification.is_read = true;
            notification.read_at = Some(at);
            flipped += 1;
        }
        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Credentials;
    use crate::adoptions::{ApplicationDetails, ApplicationStatus, QuickRequestForm};
    use crate::notifications::NotificationKind;
    use crate::pets::{Gender, PetAttributes, PetSize, PetStatus, Species};

    fn user(id: u64, username: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId(id),
            username: username.to_string(),
            email: format!("{username}@example.org"),
            first_name: String::new(),
            last_name: String::new(),
            role,
            phone_number: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            date_of_birth: None,
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
            credentials: Credentials::default(),
        }
    }

    fn pet(id: u64, shelter: u64) -> Pet {
        let now = Utc::now();
        Pet {
            id: PetId(id),
            shelter_id: UserId(shelter),
            attributes: PetAttributes {
                name: "Biscuit".to_string(),
                species: Species::Dog,
                breed: "Beagle".to_string(),
                age_years: 2,
                age_months: 0,
                gender: Gender::Male,
                size: PetSize::Medium,
                weight: None,
                color: String::new(),
                description: String::new(),
                personality_traits: String::new(),
                good_with_kids: true,
                good_with_dogs: true,
                good_with_cats: false,
                house_trained: true,
                is_spayed_neutered: true,
                is_vaccinated: true,
                medical_notes: String::new(),
                special_needs: String::new(),
                adoption_fee: 15_000,
            },
            status: PetStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(id: u64, applicant: u64, pet: u64) -> AdoptionApplication {
        AdoptionApplication {
            id: ApplicationId(id),
            applicant_id: UserId(applicant),
            pet_id: PetId(pet),
            status: ApplicationStatus::Pending,
            details: ApplicationDetails::Quick(QuickRequestForm {
                message: "hello".to_string(),
                phone_number: "+15155550100".to_string(),
                preferred_contact_time: String::new(),
            }),
            submitted_at: Utc::now(),
            reviewed_at: None,
            completed_at: None,
            reviewer_notes: String::new(),
        }
    }

    fn seeded() -> RecordStore {
        let store = RecordStore::new();
        store
            .insert_user(user(1, "adopter", Role::Adopter))
            .expect("adopter");
        store
            .insert_user(user(2, "shelter", Role::Shelter))
            .expect("shelter");
        store.insert_pet(pet(10, 2)).expect("pet");
        store
    }

    #[test]
    fn usernames_are_unique_case_insensitively() {
        let store = seeded();
        let err = store
            .insert_user(user(3, "ADOPTER", Role::Adopter))
            .expect_err("duplicate username");
        assert!(matches!(err, RepositoryError::Conflict { .. }));
    }

    #[test]
    fn pets_require_an_existing_shelter() {
        let store = seeded();
        let err = store.insert_pet(pet(11, 99)).expect_err("dangling shelter");
        assert_eq!(err, RepositoryError::MissingReference { entity: "user" });
    }

    #[test]
    fn transition_rejects_stale_expectations_without_writing() {
        let store = seeded();
        store
            .insert_application(request(100, 1, 10))
            .expect("insert");

        let err = store
            .apply_transition(TransitionWrite {
                application_id: ApplicationId(100),
                expected: ApplicationStatus::Approved,
                next: ApplicationStatus::Completed,
                reviewed_at: None,
                completed_at: Some(Utc::now()),
                reviewer_notes: None,
                pet_effect: PetEffect::Adopt,
            })
            .expect_err("stale expectation");

        assert_eq!(
            err,
            RepositoryError::StatusMismatch {
                expected: ApplicationStatus::Approved,
                actual: ApplicationStatus::Pending,
            }
        );
        let pet = store.pet(PetId(10)).expect("read").expect("present");
        assert_eq!(pet.status, PetStatus::Available);
    }

    fn write(
        id: u64,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        effect: PetEffect,
    ) -> TransitionWrite {
        TransitionWrite {
            application_id: ApplicationId(id),
            expected,
            next,
            reviewed_at: Some(Utc::now()),
            completed_at: None,
            reviewer_notes: None,
            pet_effect: effect,
        }
    }

    fn approved_pair(store: &RecordStore) {
        store
            .insert_user(user(3, "second", Role::Adopter))
            .expect("second adopter");
        store
            .insert_application(request(100, 1, 10))
            .expect("first");
        store
            .insert_application(request(101, 3, 10))
            .expect("second");
        for id in [100, 101] {
            store
                .apply_transition(write(
                    id,
                    ApplicationStatus::Pending,
                    ApplicationStatus::Approved,
                    PetEffect::Hold,
                ))
                .expect("approve");
        }
    }

    #[test]
    fn adopted_pets_cannot_be_held_or_adopted_again() {
        let store = seeded();
        approved_pair(&store);
        store
            .apply_transition(write(
                100,
                ApplicationStatus::Approved,
                ApplicationStatus::Completed,
                PetEffect::Adopt,
            ))
            .expect("first adoption");

        let err = store
            .apply_transition(write(
                101,
                ApplicationStatus::Approved,
                ApplicationStatus::Completed,
                PetEffect::Adopt,
            ))
            .expect_err("already adopted");
        assert_eq!(
            err,
            RepositoryError::PetUnavailable {
                status: PetStatus::Adopted
            }
        );
        let second = store
            .application(ApplicationId(101))
            .expect("read")
            .expect("present");
        assert_eq!(second.status, ApplicationStatus::Approved);
        assert!(second.completed_at.is_none());
    }

    #[test]
    fn completion_is_refused_while_another_adoption_completed() {
        let store = seeded();
        approved_pair(&store);
        store
            .apply_transition(write(
                100,
                ApplicationStatus::Approved,
                ApplicationStatus::Completed,
                PetEffect::Adopt,
            ))
            .expect("first adoption");
        store
            .update_pet(
                PetId(10),
                PetUpdate {
                    status: Some(PetStatus::Pending),
                    ..PetUpdate::default()
                },
                Utc::now(),
            )
            .expect("manual status");

        let err = store
            .apply_transition(write(
                101,
                ApplicationStatus::Approved,
                ApplicationStatus::Completed,
                PetEffect::Adopt,
            ))
            .expect_err("adoption already completed");
        assert!(matches!(err, RepositoryError::PetUnavailable { .. }));
    }

    #[test]
    fn release_waits_for_the_last_approved_application() {
        let store = seeded();
        approved_pair(&store);

        let first = store
            .apply_transition(write(
                100,
                ApplicationStatus::Approved,
                ApplicationStatus::Cancelled,
                PetEffect::ReleaseIfUnheld,
            ))
            .expect("cancel first");
        assert_eq!(first.pet.status, PetStatus::Pending);

        let second = store
            .apply_transition(write(
                101,
                ApplicationStatus::Approved,
                ApplicationStatus::Cancelled,
                PetEffect::ReleaseIfUnheld,
            ))
            .expect("cancel second");
        assert_eq!(second.pet.status, PetStatus::Available);
    }

    #[test]
    fn pet_updates_leave_the_status_alone_unless_asked() {
        let store = seeded();
        store
            .insert_application(request(100, 1, 10))
            .expect("insert");
        store
            .apply_transition(write(
                100,
                ApplicationStatus::Pending,
                ApplicationStatus::Approved,
                PetEffect::Hold,
            ))
            .expect("approve");

        let pet = store
            .update_pet(
                PetId(10),
                PetUpdate {
                    name: Some("Biscuit Jr".to_string()),
                    ..PetUpdate::default()
                },
                Utc::now(),
            )
            .expect("rename");
        assert_eq!(pet.attributes.name, "Biscuit Jr");
        assert_eq!(pet.status, PetStatus::Pending);
    }

    #[test]
    fn deleting_a_pet_cascades_to_dependents() {
        let store = seeded();
        store
            .insert_application(request(100, 1, 10))
            .expect("insert");
        store
            .toggle_favorite(UserId(1), PetId(10), Utc::now())
            .expect("favorite");
        store
            .insert_notification(Notification {
                id: NotificationId(5),
                recipient_id: UserId(2),
                sender_id: Some(UserId(1)),
                notification_type: NotificationKind::AdoptionRequest,
                title: "New request".to_string(),
                message: "Biscuit".to_string(),
                pet_id: None,
                application_id: Some(ApplicationId(100)),
                is_read: false,
                is_important: true,
                created_at: Utc::now(),
                read_at: None,
            })
            .expect("notification");

        store.delete_pet(PetId(10)).expect("delete");

        assert!(store
            .application(ApplicationId(100))
            .expect("read")
            .is_none());
        assert!(store.favorites_of(UserId(1)).expect("read").is_empty());
        assert_eq!(store.unread_count(UserId(2)).expect("count"), 0);
    }

    #[test]
    fn favorite_toggle_alternates() {
        let store = seeded();
        let states: Vec<bool> = (0..4)
            .map(|_| {
                store
                    .toggle_favorite(UserId(1), PetId(10), Utc::now())
                    .expect("toggle")
            })
            .collect();
        assert_eq!(states, vec![true, false, true, false]);
    }
}
