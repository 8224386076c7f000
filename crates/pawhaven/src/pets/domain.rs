use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::{ShelterProfile, UserId};
use crate::validation::{is_blank, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetImageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Hamster,
    GuineaPig,
    Other,
}

impl Species {
    pub const fn label(self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Bird => "bird",
            Species::Rabbit => "rabbit",
            Species::Hamster => "hamster",
            Species::GuineaPig => "guinea_pig",
            Species::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Adoption availability. Moved by the application lifecycle or directly by the owning shelter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    Available,
    Pending,
    Adopted,
}

impl PetStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Adopted => "adopted",
        }
    }
}

impl Default for PetStatus {
    fn default() -> Self {
        PetStatus::Available
    }
}

/// A listed animal, owned by exactly one shelter account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub shelter_id: UserId,
    #[serde(flatten)]
    pub attributes: PetAttributes,
    pub status: PetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn age_display(&self) -> String {
        age_display(self.attributes.age_years, self.attributes.age_months)
    }
}

/// Shelter-editable fields of a pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetAttributes {
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age_years: u8,
    #[serde(default)]
    pub age_months: u8,
    pub gender: Gender,
    pub size: PetSize,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personality_traits: String,
    #[serde(default)]
    pub good_with_kids: bool,
    #[serde(default)]
    pub good_with_dogs: bool,
    #[serde(default)]
    pub good_with_cats: bool,
    #[serde(default)]
    pub house_trained: bool,
    #[serde(default)]
    pub is_spayed_neutered: bool,
    #[serde(default)]
    pub is_vaccinated: bool,
    #[serde(default)]
    pub medical_notes: String,
    #[serde(default)]
    pub special_needs: String,
    /// Fee in cents.
    #[serde(default)]
    pub adoption_fee: u32,
}

impl PetAttributes {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(!is_blank(&self.name), "name", "name is required");
        errors.check(self.age_months < 12, "age_months", "must be between 0 and 11");
        errors.check(
            self.weight.map_or(true, |weight| weight.is_finite() && weight > 0.0),
            "weight",
            "must be a positive number",
        );
        errors.into_result()
    }
}

/// Partial update of a pet; `status` lets the shelter set availability directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age_years: Option<u8>,
    pub age_months: Option<u8>,
    pub size: Option<PetSize>,
    pub weight: Option<f32>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub personality_traits: Option<String>,
    pub good_with_kids: Option<bool>,
    pub good_with_dogs: Option<bool>,
    pub good_with_cats: Option<bool>,
    pub house_trained: Option<bool>,
    pub is_spayed_neutered: Option<bool>,
    pub is_vaccinated: Option<bool>,
    pub medical_notes: Option<String>,
    pub special_needs: Option<String>,
    pub adoption_fee: Option<u32>,
    pub status: Option<PetStatus>,
}

impl PetUpdate {
    pub(crate) fn apply(self, attributes: &mut PetAttributes) {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut attributes.name, self.name);
        set(&mut attributes.breed, self.breed);
        set(&mut attributes.age_years, self.age_years);
        set(&mut attributes.age_months, self.age_months);
        set(&mut attributes.size, self.size);
        if self.weight.is_some() {
            attributes.weight = self.weight;
        }
        set(&mut attributes.color, self.color);
        set(&mut attributes.description, self.description);
        set(&mut attributes.personality_traits, self.personality_traits);
        set(&mut attributes.good_with_kids, self.good_with_kids);
        set(&mut attributes.good_with_dogs, self.good_with_dogs);
        set(&mut attributes.good_with_cats, self.good_with_cats);
        set(&mut attributes.house_trained, self.house_trained);
        set(&mut attributes.is_spayed_neutered, self.is_spayed_neutered);
        set(&mut attributes.is_vaccinated, self.is_vaccinated);
        set(&mut attributes.medical_notes, self.medical_notes);
        set(&mut attributes.special_needs, self.special_needs);
        set(&mut attributes.adoption_fee, self.adoption_fee);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetImage {
    pub id: PetImageId,
    pub pet_id: PetId,
    pub path: String,
    pub content_type: String,
    pub caption: String,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetImageUpload {
    pub path: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetFavorite {
    pub user_id: UserId,
    pub pet_id: PetId,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a favorite toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteToggle {
    pub favorited: bool,
    pub message: String,
}

/// Card-sized projection used by listings and search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetSummary {
    pub id: PetId,
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub age_years: u8,
    pub age_months: u8,
    pub age_display: String,
    pub gender: Gender,
    pub size: PetSize,
    pub weight: Option<f32>,
    pub color: String,
    pub status: PetStatus,
    pub adoption_fee: u32,
    pub good_with_kids: bool,
    pub good_with_dogs: bool,
    pub good_with_cats: bool,
    pub house_trained: bool,
    pub is_spayed_neutered: bool,
    pub is_vaccinated: bool,
    pub shelter_name: Option<String>,
    pub shelter_city: Option<String>,
    pub main_image: Option<String>,
    pub is_favorited: bool,
    pub created_at: DateTime<Utc>,
}

/// Full projection for the detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetDetail {
    #[serde(flatten)]
    pub pet: Pet,
    pub age_display: String,
    pub shelter: Option<ShelterProfile>,
    pub images: Vec<PetImage>,
    pub is_favorited: bool,
    pub can_apply: bool,
}

/// "3 years, 6 months" style age label.
pub fn age_display(years: u8, months: u8) -> String {
    fn unit(value: u8, singular: &str) -> String {
        if value == 1 {
            format!("1 {singular}")
        } else {
            format!("{value} {singular}s")
        }
    }

    match (years, months) {
        (0, months) => unit(months, "month"),
        (years, 0) => unit(years, "year"),
        (years, months) => format!("{}, {}", unit(years, "year"), unit(months, "month")),
    }
}

/// The flagged primary image, falling back to the earliest upload.
pub fn main_image(images: &[PetImage]) -> Option<&PetImage> {
    images
        .iter()
        .find(|image| image.is_primary)
        .or_else(|| images.iter().min_by_key(|image| image.id))
}
