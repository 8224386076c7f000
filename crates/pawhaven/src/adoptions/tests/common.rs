pub(super) use crate::testing::*;

use crate::access::Actor;
use crate::accounts::Role;
use crate::adoptions::{AdoptionApplication, ApplicationId, ApplicationRepository};
use crate::notifications::{Mailer, Notification, NotificationRepository};
use crate::pets::{Pet, PetRepository};
use crate::platform::Platform;
use crate::store::RecordStore;

/// A shelter with one listed pet and an adopter whose full application is pending.
pub(super) struct Scenario {
    pub(super) shelter: Actor,
    pub(super) adopter: Actor,
    pub(super) pet: Pet,
    pub(super) application: ApplicationId,
}

pub(super) fn scenario<M: Mailer + 'static>(platform: &Platform<RecordStore, M>) -> Scenario {
    let shelter = shelter(platform, "harbor");
    let adopter = register(platform, "alex", Role::Adopter);
    let pet = list_pet(platform, &shelter, "Biscuit");
    let view = platform
        .adoptions
        .submit_application(&adopter, submission(pet.id))
        .expect("application submitted");

    Scenario {
        shelter,
        adopter,
        pet,
        application: view.application.id,
    }
}

pub(super) fn stored_pet<M>(platform: &Platform<RecordStore, M>, pet: &Pet) -> Pet {
    platform
        .store
        .pet(pet.id)
        .expect("store readable")
        .expect("pet exists")
}

pub(super) fn stored_application<M>(
    platform: &Platform<RecordStore, M>,
    id: ApplicationId,
) -> AdoptionApplication {
    platform
        .store
        .application(id)
        .expect("store readable")
        .expect("application exists")
}

pub(super) fn inbox<M>(platform: &Platform<RecordStore, M>, actor: &Actor) -> Vec<Notification> {
    platform
        .store
        .notifications_for(actor.id, None)
        .expect("store readable")
}
