use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::domain::{
    AccountOverview, AdopterProfile, AdopterProfileInput, AuthSession, AuthToken, Credentials,
    LoginRequest, ProfileUpdate, Registration, Role, ShelterProfile, ShelterProfileInput, User,
    UserId, UserProfileView,
};
use super::repository::UserRepository;
use crate::access::{Actor, Capability, PermissionError};
use crate::store::RepositoryError;
use crate::validation::{is_blank, is_valid_phone_number, ValidationErrors};

const MIN_PASSWORD_LENGTH: usize = 8;

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    UserId(USER_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl Credentials {
    pub(crate) fn from_password(password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    pub(crate) fn verify(&self, password: &str) -> bool {
        !self.digest.is_empty()
            && digests_match(digest(&self.salt, password).as_bytes(), self.digest.as_bytes())
    }
}

/// Compares every byte regardless of where the first difference sits.
fn digests_match(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

/// Registration, login, token resolution and onboarding profiles.
pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S> AccountService<S>
where
    S: UserRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Public self-registration for adopters and shelters.
    pub fn register(&self, registration: Registration) -> Result<AuthSession, AccountError> {
        if registration.role == Role::Admin {
            return Err(AccountError::Validation(ValidationErrors::single(
                "role",
                "administrator accounts cannot be self-registered",
            )));
        }
        self.create_account(registration)
    }

    /// Operator path for staff accounts; never routed over HTTP.
    pub fn create_administrator(
        &self,
        registration: Registration,
    ) -> Result<AuthSession, AccountError> {
        self.create_account(Registration {
            role: Role::Admin,
            ..registration
        })
    }

    fn create_account(&self, registration: Registration) -> Result<AuthSession, AccountError> {
        let mut errors = ValidationErrors::new();
        errors.check(
            !is_blank(&registration.username),
            "username",
            "this field is required",
        );
        errors.check(
            registration.email.contains('@'),
            "email",
            "enter a valid email address",
        );
        errors.check(
            registration.password.chars().count() >= MIN_PASSWORD_LENGTH,
            "password",
            "password must be at least 8 characters",
        );
        errors.check(
            registration.password == registration.password_confirm,
            "password_confirm",
            "passwords don't match",
        );
        if !is_blank(&registration.phone_number) {
            errors.check(
                is_valid_phone_number(&registration.phone_number),
                "phone_number",
                "enter a phone number like +999999999",
            );
        }
        if self
            .store
            .user_by_username(registration.username.trim())?
            .is_some()
        {
            errors.push("username", "a user with that username already exists");
        }
        errors.into_result()?;

        let now = Utc::now();
        let user = User {
            id: next_user_id(),
            username: registration.username.trim().to_string(),
            email: registration.email.trim().to_string(),
            first_name: registration.first_name,
            last_name: registration.last_name,
            role: registration.role,
            phone_number: registration.phone_number,
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            date_of_birth: None,
            is_staff: registration.role == Role::Admin,
            is_active: true,
            created_at: now,
            updated_at: now,
            credentials: Credentials::from_password(&registration.password),
        };

        let user = match self.store.insert_user(user) {
            Ok(user) => user,
            Err(RepositoryError::Conflict { .. }) => {
                return Err(AccountError::Validation(ValidationErrors::single(
                    "username",
                    "a user with that username already exists",
                )))
            }
            Err(other) => return Err(other.into()),
        };
        let token = self.issue_token(user.id)?;

        info!(user_id = user.id.0, role = user.role.label(), "account registered");
        Ok(AuthSession {
            user: user.profile_view(),
            token,
            message: "Registration successful",
        })
    }

    pub fn login(&self, request: LoginRequest) -> Result<AuthSession, AccountError> {
        let invalid = || {
            AccountError::Validation(ValidationErrors::single(
                "non_field_errors",
                "invalid credentials",
            ))
        };

        let user = self
            .store
            .user_by_username(request.username.trim())?
            .ok_or_else(invalid)?;
        if !user.credentials.verify(&request.password) {
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AccountError::Validation(ValidationErrors::single(
                "non_field_errors",
                "user account is disabled",
            )));
        }

        let token = match self.store.token_for_user(user.id)? {
            Some(token) => token,
            None => self.issue_token(user.id)?,
        };

        info!(user_id = user.id.0, "login succeeded");
        Ok(AuthSession {
            user: user.profile_view(),
            token,
            message: "Login successful",
        })
    }

    /// Resolves an API token to the calling actor.
    pub fn authenticate(&self, token: &AuthToken) -> Result<Actor, AccountError> {
        match self.store.user_for_token(token)? {
            Some(user) if user.is_active => Ok(Actor::from(&user)),
            _ => Err(AccountError::Unauthenticated),
        }
    }

    pub fn user(&self, id: UserId) -> Result<User, AccountError> {
        self.store.user(id)?.ok_or(AccountError::NotFound)
    }

    pub fn profile(&self, actor: &Actor) -> Result<AccountOverview, AccountError> {
        let user = self.user(actor.id)?;
        debug!(user_id = user.id.0, "profile read");
        Ok(AccountOverview {
            shelter_profile: self.store.shelter_profile(user.id)?,
            adopter_profile: self.store.adopter_profile(user.id)?,
            user: user.profile_view(),
        })
    }

    pub fn update_profile(
        &self,
        actor: &Actor,
        changes: ProfileUpdate,
    ) -> Result<UserProfileView, AccountError> {
        let mut user = self.user(actor.id)?;

        let mut errors = ValidationErrors::new();
        if let Some(email) = &changes.email {
            errors.check(email.contains('@'), "email", "enter a valid email address");
        }
        if let Some(phone) = changes.phone_number.as_deref().filter(|p| !is_blank(p)) {
            errors.check(
                is_valid_phone_number(phone),
                "phone_number",
                "enter a phone number like +999999999",
            );
        }
        errors.into_result()?;

        let ProfileUpdate {
            first_name,
            last_name,
            email,
            phone_number,
            address,
            city,
            state,
            zip_code,
            date_of_birth,
        } = changes;
        let fields = [
            (&mut user.first_name, first_name),
            (&mut user.last_name, last_name),
            (&mut user.email, email),
            (&mut user.phone_number, phone_number),
            (&mut user.address, address),
            (&mut user.city, city),
            (&mut user.state, state),
            (&mut user.zip_code, zip_code),
        ];
        for (target, value) in fields {
            if let Some(value) = value {
                *target = value;
            }
        }
        if date_of_birth.is_some() {
            user.date_of_birth = date_of_birth;
        }
        user.updated_at = Utc::now();

        self.store.update_user(user.clone())?;
        Ok(user.profile_view())
    }

    pub fn setup_shelter_profile(
        &self,
        actor: &Actor,
        input: ShelterProfileInput,
    ) -> Result<ShelterProfile, AccountError> {
        Capability::SetupProfile {
            required: Role::Shelter,
        }
        .check(actor)?;

        let mut errors = ValidationErrors::new();
        errors.check(
            !is_blank(&input.organization_name),
            "organization_name",
            "this field is required",
        );
        errors.check(
            !is_blank(&input.license_number),
            "license_number",
            "this field is required",
        );
        errors.check(input.capacity > 0, "capacity", "must be at least 1");
        errors.into_result()?;

        let profile = self.store.insert_shelter_profile(ShelterProfile {
            user_id: actor.id,
            organization_name: input.organization_name,
            license_number: input.license_number.trim().to_string(),
            website: input.website,
            description: input.description,
            capacity: input.capacity,
            established_date: input.established_date,
            is_verified: false,
        })?;

        info!(user_id = actor.id.0, "shelter profile created");
        Ok(profile)
    }

    pub fn setup_adopter_profile(
        &self,
        actor: &Actor,
        input: AdopterProfileInput,
    ) -> Result<AdopterProfile, AccountError> {
        Capability::SetupProfile {
            required: Role::Adopter,
        }
        .check(actor)?;

        if input.household_members == 0 {
            return Err(AccountError::Validation(ValidationErrors::single(
                "household_members",
                "must be at least 1",
            )));
        }

        let profile = self.store.insert_adopter_profile(AdopterProfile {
            user_id: actor.id,
            housing_type: input.housing_type,
            has_yard: input.has_yard,
            has_other_pets: input.has_other_pets,
            other_pets_description: input.other_pets_description,
            household_members: input.household_members,
            experience_with_pets: input.experience_with_pets,
            preferred_pet_age: input.preferred_pet_age,
            preferred_pet_size: input.preferred_pet_size,
            is_approved: false,
        })?;

        info!(user_id = actor.id.0, "adopter profile created");
        Ok(profile)
    }

    fn issue_token(&self, user_id: UserId) -> Result<AuthToken, AccountError> {
        let token = AuthToken(uuid::Uuid::new_v4().simple().to_string());
        self.store.insert_token(token.clone(), user_id)?;
        Ok(token)
    }
}

/// Error raised by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("authentication credentials were not provided or are invalid")]
    Unauthenticated,
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error("account not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use chrono::NaiveDate;

    fn service() -> AccountService<RecordStore> {
        AccountService::new(Arc::new(RecordStore::new()))
    }

    fn registration(username: &str, role: Role) -> Registration {
        Registration {
            username: username.to_string(),
            email: format!("{username}@example.org"),
            first_name: "Sam".to_string(),
            last_name: "Rivera".to_string(),
            role,
            phone_number: "+15155550123".to_string(),
            password: "correct-horse".to_string(),
            password_confirm: "correct-horse".to_string(),
        }
    }

    #[test]
    fn register_then_login_returns_the_same_token() {
        let service = service();
        let session = service
            .register(registration("sam", Role::Adopter))
            .expect("registers");

        let login = service
            .login(LoginRequest {
                username: "sam".to_string(),
                password: "correct-horse".to_string(),
            })
            .expect("logs in");

        assert_eq!(session.token, login.token);
        let actor = service.authenticate(&login.token).expect("token resolves");
        assert_eq!(actor.id, session.user.id);
        assert_eq!(actor.role, Role::Adopter);
    }

    #[test]
    fn register_reports_every_invalid_field() {
        let mut input = registration("", Role::Adopter);
        input.email = "not-an-email".to_string();
        input.password = "short".to_string();
        input.password_confirm = "different".to_string();

        let err = service().register(input).expect_err("invalid");
        let AccountError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        for field in ["username", "email", "password", "password_confirm"] {
            assert!(errors.has_field(field), "missing {field}");
        }
    }

    #[test]
    fn wrong_password_is_rejected() {
        let service = service();
        service
            .register(registration("sam", Role::Adopter))
            .expect("registers");

        let err = service
            .login(LoginRequest {
                username: "sam".to_string(),
                password: "nope-nope".to_string(),
            })
            .expect_err("bad password");
        assert!(matches!(err, AccountError::Validation(_)));
    }

    #[test]
    fn administrators_cannot_self_register() {
        let service = service();
        let err = service
            .register(registration("root", Role::Admin))
            .expect_err("admin sign-up refused");
        let AccountError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.has_field("role"));
        assert!(service
            .login(LoginRequest {
                username: "root".to_string(),
                password: "correct-horse".to_string(),
            })
            .is_err());
    }

    #[test]
    fn operators_create_staff_administrators() {
        let service = service();
        let session = service
            .create_administrator(registration("root", Role::Adopter))
            .expect("admin created");
        let user = service.user(session.user.id).expect("stored");
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_staff);
    }

    #[test]
    fn digest_comparison_requires_equal_length_and_bytes() {
        assert!(digests_match(b"abc123", b"abc123"));
        assert!(!digests_match(b"abc123", b"abc124"));
        assert!(!digests_match(b"abc123", b"abc12"));
        assert!(!digests_match(b"", b"a"));

        let credentials = Credentials::from_password("correct-horse");
        assert!(credentials.verify("correct-horse"));
        assert!(!credentials.verify("correct-hors"));
        assert!(!Credentials::default().verify(""));
    }

    #[test]
    fn unknown_tokens_are_unauthenticated() {
        let err = service()
            .authenticate(&AuthToken("missing".to_string()))
            .expect_err("unknown token");
        assert!(matches!(err, AccountError::Unauthenticated));
    }

    #[test]
    fn shelter_profile_is_role_matched_and_created_once() {
        let service = service();
        let adopter = service
            .register(registration("ada", Role::Adopter))
            .expect("adopter");
        let shelter = service
            .register(registration("haven", Role::Shelter))
            .expect("shelter");
        let input = ShelterProfileInput {
            organization_name: "Haven Rescue".to_string(),
            license_number: "LIC-1".to_string(),
            website: String::new(),
            description: "Dogs and cats".to_string(),
            capacity: 40,
            established_date: NaiveDate::from_ymd_opt(2012, 3, 1).expect("valid date"),
        };

        let adopter_actor = service.authenticate(&adopter.token).expect("actor");
        let err = service
            .setup_shelter_profile(&adopter_actor, input.clone())
            .expect_err("adopters cannot own shelters");
        assert!(matches!(err, AccountError::Permission(_)));

        let shelter_actor = service.authenticate(&shelter.token).expect("actor");
        service
            .setup_shelter_profile(&shelter_actor, input.clone())
            .expect("first profile");
        let err = service
            .setup_shelter_profile(&shelter_actor, input)
            .expect_err("second profile");
        assert!(matches!(
            err,
            AccountError::Repository(RepositoryError::Conflict { .. })
        ));
    }

    #[test]
    fn update_profile_keeps_unspecified_fields() {
        let service = service();
        let session = service
            .register(registration("sam", Role::Adopter))
            .expect("registers");
        let actor = service.authenticate(&session.token).expect("actor");

        let view = service
            .update_profile(
                &actor,
                ProfileUpdate {
                    city: Some("Des Moines".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .expect("updates");

        assert_eq!(view.city, "Des Moines");
        assert_eq!(view.first_name, "Sam");
    }
}
