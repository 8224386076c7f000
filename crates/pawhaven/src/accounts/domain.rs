use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for platform users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Role tag fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Adopter,
    Shelter,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Adopter => "adopter",
            Role::Shelter => "shelter",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Adopter
    }
}

/// Stored account. The password digest never leaves the crate through serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub credentials: Credentials,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Full name when set, otherwise the username.
    pub fn display_name(&self) -> String {
        let full_name = self.full_name();
        if full_name.is_empty() {
            self.username.clone()
        } else {
            full_name
        }
    }

    pub fn profile_view(&self) -> UserProfileView {
        UserProfileView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            user_type: self.role,
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            date_of_birth: self.date_of_birth,
            date_joined: self.created_at,
        }
    }
}

/// Salted password digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub salt: String,
    pub digest: String,
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub user_type: Role,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_joined: DateTime<Utc>,
}

/// Sign-up payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, rename = "user_type")]
    pub role: Role,
    #[serde(default)]
    pub phone_number: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Editable contact fields; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Opaque API token handed out on register/login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(pub String);

/// Response body for register/login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: UserProfileView,
    pub token: AuthToken,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelterProfile {
    pub user_id: UserId,
    pub organization_name: String,
    pub license_number: String,
    pub website: String,
    pub description: String,
    pub capacity: u32,
    pub established_date: NaiveDate,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelterProfileInput {
    pub organization_name: String,
    pub license_number: String,
    #[serde(default)]
    pub website: String,
    pub description: String,
    pub capacity: u32,
    pub established_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    Apartment,
    House,
    Condo,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdopterProfile {
    pub user_id: UserId,
    pub housing_type: HousingType,
    pub has_yard: bool,
    pub has_other_pets: bool,
    pub other_pets_description: String,
    pub household_members: u32,
    pub experience_with_pets: String,
    pub preferred_pet_age: String,
    pub preferred_pet_size: String,
    pub is_approved: bool,
}

fn one_member() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdopterProfileInput {
    pub housing_type: HousingType,
    #[serde(default)]
    pub has_yard: bool,
    #[serde(default)]
    pub has_other_pets: bool,
    #[serde(default)]
    pub other_pets_description: String,
    #[serde(default = "one_member")]
    pub household_members: u32,
    #[serde(default)]
    pub experience_with_pets: String,
    #[serde(default)]
    pub preferred_pet_age: String,
    #[serde(default)]
    pub preferred_pet_size: String,
}

/// Profile response combining the account with whichever extension exists.
#[derive(Debug, Clone, Serialize)]
pub struct AccountOverview {
    pub user: UserProfileView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelter_profile: Option<ShelterProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopter_profile: Option<AdopterProfile>,
}
