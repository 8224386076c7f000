//! Listing filters, the advanced search payload and result ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{Gender, Pet, PetSize, Species};
use crate::accounts::User;
use crate::validation::ValidationErrors;

/// Query-string filters accepted by the public pet listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PetQuery {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub species: Option<Species>,
    pub size: Option<PetSize>,
    pub gender: Option<Gender>,
    pub age_min: Option<u8>,
    pub age_max: Option<u8>,
    pub fee_min: Option<u32>,
    pub fee_max: Option<u32>,
    pub good_with_kids: Option<bool>,
    pub good_with_dogs: Option<bool>,
    pub good_with_cats: Option<bool>,
    pub house_trained: Option<bool>,
    pub is_spayed_neutered: Option<bool>,
    pub is_vaccinated: Option<bool>,
    pub shelter_city: Option<String>,
    pub shelter_state: Option<String>,
    /// Free text over name, breed, description and personality traits.
    pub search: Option<String>,
    /// `created_at`, `name`, `age_years` or `adoption_fee`; prefix `-` for descending.
    pub ordering: Option<String>,
}

/// Body of the advanced search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub species: Option<Species>,
    pub breed: Option<String>,
    pub size: Option<PetSize>,
    pub gender: Option<Gender>,
    pub age_min: Option<u8>,
    pub age_max: Option<u8>,
    pub good_with_kids: Option<bool>,
    pub good_with_dogs: Option<bool>,
    pub good_with_cats: Option<bool>,
    pub house_trained: Option<bool>,
    /// Upper fee bound in cents.
    pub max_fee: Option<u32>,
    /// Matches the shelter's city or state.
    pub location: Option<String>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Blank strings in a filter behave like an absent filter.
fn text(filter: &Option<String>) -> Option<&str> {
    filter
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn flag(filter: Option<bool>, value: bool) -> bool {
    filter.map_or(true, |expected| expected == value)
}

fn equals<T: PartialEq>(filter: Option<T>, value: T) -> bool {
    filter.map_or(true, |expected| expected == value)
}

fn matches_free_text(pet: &Pet, needle: &str) -> bool {
    let attributes = &pet.attributes;
    [
        attributes.name.as_str(),
        attributes.breed.as_str(),
        attributes.description.as_str(),
        attributes.personality_traits.as_str(),
    ]
    .iter()
    .any(|field| contains_ignore_case(field, needle))
}

impl PetQuery {
    pub fn matches(&self, pet: &Pet, shelter: Option<&User>) -> bool {
        let attributes = &pet.attributes;
        let shelter_field = |filter: &Option<String>, pick: fn(&User) -> &str| {
            text(filter).map_or(true, |needle| {
                shelter.map_or(false, |user| contains_ignore_case(pick(user), needle))
            })
        };

        text(&self.name).map_or(true, |needle| contains_ignore_case(&attributes.name, needle))
            && text(&self.breed).map_or(true, |needle| contains_ignore_case(&attributes.breed, needle))
            && equals(self.species, attributes.species)
            && equals(self.size, attributes.size)
            && equals(self.gender, attributes.gender)
            && self.age_min.map_or(true, |min| attributes.age_years >= min)
            && self.age_max.map_or(true, |max| attributes.age_years <= max)
            && self.fee_min.map_or(true, |min| attributes.adoption_fee >= min)
            && self.fee_max.map_or(true, |max| attributes.adoption_fee <= max)
            && flag(self.good_with_kids, attributes.good_with_kids)
            && flag(self.good_with_dogs, attributes.good_with_dogs)
            && flag(self.good_with_cats, attributes.good_with_cats)
            && flag(self.house_trained, attributes.house_trained)
            && flag(self.is_spayed_neutered, attributes.is_spayed_neutered)
            && flag(self.is_vaccinated, attributes.is_vaccinated)
            && shelter_field(&self.shelter_city, |user| user.city.as_str())
            && shelter_field(&self.shelter_state, |user| user.state.as_str())
            && text(&self.search).map_or(true, |needle| matches_free_text(pet, needle))
    }

    pub fn ordering(&self) -> Result<PetOrdering, ValidationErrors> {
        match text(&self.ordering) {
            Some(raw) => PetOrdering::parse(raw),
            None => Ok(PetOrdering::default()),
        }
    }
}

impl SearchFilters {
    pub fn matches(&self, pet: &Pet, shelter: Option<&User>) -> bool {
        let attributes = &pet.attributes;
        let location = text(&self.location).map_or(true, |needle| {
            shelter.map_or(false, |user| {
                contains_ignore_case(&user.city, needle) || contains_ignore_case(&user.state, needle)
            })
        });

        text(&self.query).map_or(true, |needle| matches_free_text(pet, needle))
            && equals(self.species, attributes.species)
            && text(&self.breed).map_or(true, |needle| contains_ignore_case(&attributes.breed, needle))
            && equals(self.size, attributes.size)
            && equals(self.gender, attributes.gender)
            && self.age_min.map_or(true, |min| attributes.age_years >= min)
            && self.age_max.map_or(true, |max| attributes.age_years <= max)
            && flag(self.good_with_kids, attributes.good_with_kids)
            && flag(self.good_with_dogs, attributes.good_with_dogs)
            && flag(self.good_with_cats, attributes.good_with_cats)
            && flag(self.house_trained, attributes.house_trained)
            && self.max_fee.map_or(true, |max| attributes.adoption_fee <= max)
            && location
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    CreatedAt,
    Name,
    AgeYears,
    AdoptionFee,
}

/// Sort key for pet listings. Ties fall back to the pet id in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PetOrdering {
    pub field: OrderField,
    pub descending: bool,
}

impl Default for PetOrdering {
    fn default() -> Self {
        Self {
            field: OrderField::CreatedAt,
            descending: true,
        }
    }
}

impl PetOrdering {
    pub fn parse(raw: &str) -> Result<Self, ValidationErrors> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, raw),
        };
        let field = match name {
            "created_at" => OrderField::CreatedAt,
            "name" => OrderField::Name,
            "age_years" => OrderField::AgeYears,
            "adoption_fee" => OrderField::AdoptionFee,
            other => {
                return Err(ValidationErrors::single(
                    "ordering",
                    format!("cannot order by '{other}'"),
                ))
            }
        };
        Ok(Self { field, descending })
    }

    fn compare(&self, left: &Pet, right: &Pet) -> Ordering {
        let (a, b) = (&left.attributes, &right.attributes);
        let primary = match self.field {
            OrderField::CreatedAt => left.created_at.cmp(&right.created_at),
            OrderField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            OrderField::AgeYears => (a.age_years, a.age_months).cmp(&(b.age_years, b.age_months)),
            OrderField::AdoptionFee => a.adoption_fee.cmp(&b.adoption_fee),
        };
        let ordering = primary.then_with(|| left.id.cmp(&right.id));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    pub fn sort(&self, pets: &mut [Pet]) {
        pets.sort_by(|left, right| self.compare(left, right));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pets::domain::{PetAttributes, PetId, PetStatus};
    use crate::accounts::UserId;
    use chrono::{Duration, Utc};

    fn pet(id: u64, name: &str, species: Species, age_years: u8, fee: u32) -> Pet {
        let created_at = Utc::now() + Duration::seconds(id as i64);
        Pet {
            id: PetId(id),
            shelter_id: UserId(1),
            attributes: PetAttributes {
                name: name.to_string(),
                species,
                breed: "Mixed".to_string(),
                age_years,
                age_months: 0,
                gender: Gender::Female,
                size: PetSize::Small,
                weight: None,
                color: String::new(),
                description: "Loves long naps in the sun".to_string(),
                personality_traits: "calm".to_string(),
                good_with_kids: true,
                good_with_dogs: false,
                good_with_cats: true,
                house_trained: true,
                is_spayed_neutered: true,
                is_vaccinated: true,
                medical_notes: String::new(),
                special_needs: String::new(),
                adoption_fee: fee,
            },
            status: PetStatus::Available,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn free_text_covers_description_and_traits() {
        let luna = pet(1, "Luna", Species::Cat, 2, 5_000);
        let query = PetQuery {
            search: Some("NAPS".to_string()),
            ..PetQuery::default()
        };
        assert!(query.matches(&luna, None));

        let query = PetQuery {
            search: Some("energetic".to_string()),
            ..PetQuery::default()
        };
        assert!(!query.matches(&luna, None));
    }

    #[test]
    fn compatibility_flags_and_age_range_combine() {
        let luna = pet(1, "Luna", Species::Cat, 2, 5_000);
        let filters = SearchFilters {
            good_with_dogs: Some(false),
            age_min: Some(1),
            age_max: Some(3),
            max_fee: Some(5_000),
            ..SearchFilters::default()
        };
        assert!(filters.matches(&luna, None));

        let filters = SearchFilters {
            good_with_dogs: Some(true),
            ..SearchFilters::default()
        };
        assert!(!filters.matches(&luna, None));
    }

    #[test]
    fn location_filter_requires_a_known_shelter() {
        let luna = pet(1, "Luna", Species::Cat, 2, 5_000);
        let filters = SearchFilters {
            location: Some("pet city".to_string()),
            ..SearchFilters::default()
        };
        assert!(!filters.matches(&luna, None));
    }

    #[test]
    fn ordering_defaults_to_newest_first() {
        let mut pets = vec![
            pet(1, "Ace", Species::Dog, 4, 100),
            pet(3, "Cleo", Species::Cat, 1, 300),
            pet(2, "Bo", Species::Dog, 2, 200),
        ];
        PetOrdering::default().sort(&mut pets);
        let ids: Vec<u64> = pets.iter().map(|pet| pet.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        PetOrdering::parse("adoption_fee")
            .expect("known field")
            .sort(&mut pets);
        let fees: Vec<u32> = pets.iter().map(|pet| pet.attributes.adoption_fee).collect();
        assert_eq!(fees, vec![100, 200, 300]);
    }

    #[test]
    fn unknown_ordering_is_a_validation_error() {
        let err = PetOrdering::parse("-weight").expect_err("unsupported");
        assert!(err.has_field("ordering"));
    }
}
