use std::io::Read;

use serde::{Deserialize, Deserializer};

use crate::pets::{Gender, PetAttributes, PetSize, Species};

/// One catalog row: the owning shelter's username plus the pet's fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub shelter: String,
    pub attributes: PetAttributes,
}

pub(crate) fn parse_entries<R: Read>(reader: R) -> Result<Vec<CatalogEntry>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for record in csv_reader.deserialize::<CatalogRow>() {
        let row = record?;
        entries.push(row.into_entry());
    }

    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    shelter: String,
    name: String,
    species: Species,
    #[serde(default)]
    breed: String,
    #[serde(default)]
    age_years: u8,
    #[serde(default)]
    age_months: u8,
    gender: Gender,
    size: PetSize,
    #[serde(default)]
    weight: Option<f32>,
    #[serde(default)]
    color: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    personality_traits: String,
    #[serde(default)]
    good_with_kids: bool,
    #[serde(default)]
    good_with_dogs: bool,
    #[serde(default)]
    good_with_cats: bool,
    #[serde(default)]
    house_trained: bool,
    #[serde(default)]
    is_spayed_neutered: bool,
    #[serde(default)]
    is_vaccinated: bool,
    #[serde(default)]
    medical_notes: String,
    #[serde(default)]
    special_needs: String,
    #[serde(default, deserialize_with = "fee_in_cents")]
    adoption_fee: u32,
}

impl CatalogRow {
    fn into_entry(self) -> CatalogEntry {
        CatalogEntry {
            shelter: self.shelter,
            attributes: PetAttributes {
                name: self.name,
                species: self.species,
                breed: self.breed,
                age_years: self.age_years,
                age_months: self.age_months,
                gender: self.gender,
                size: self.size,
                weight: self.weight,
                color: self.color,
                description: self.description,
                personality_traits: self.personality_traits,
                good_with_kids: self.good_with_kids,
                good_with_dogs: self.good_with_dogs,
                good_with_cats: self.good_with_cats,
                house_trained: self.house_trained,
                is_spayed_neutered: self.is_spayed_neutered,
                is_vaccinated: self.is_vaccinated,
                medical_notes: self.medical_notes,
                special_needs: self.special_needs,
                adoption_fee: self.adoption_fee,
            },
        }
    }
}

/// Reads `"250.00"` style amounts as cents.
fn fee_in_cents<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_fee(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid fee '{raw}'")))
}

pub(crate) fn parse_fee(raw: &str) -> Option<u32> {
    let trimmed = raw.trim().trim_start_matches('$');
    if trimmed.is_empty() {
        return Some(0);
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let dollars: u32 = whole.parse().ok()?;
    let cents: u32 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u32>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    dollars.checked_mul(100)?.checked_add(cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fees_are_read_as_cents() {
        assert_eq!(parse_fee("250.00"), Some(25_000));
        assert_eq!(parse_fee("$75.5"), Some(7_550));
        assert_eq!(parse_fee("12"), Some(1_200));
        assert_eq!(parse_fee(""), Some(0));
        assert_eq!(parse_fee("1.234"), None);
        assert_eq!(parse_fee("free"), None);
    }

    #[test]
    fn rows_map_onto_pet_attributes() {
        let data = "shelter,name,species,breed,age_years,age_months,gender,size,weight,color,\
description,personality_traits,good_with_kids,good_with_dogs,good_with_cats,house_trained,\
is_spayed_neutered,is_vaccinated,medical_notes,special_needs,adoption_fee\n\
rescue_haven,Pip,guinea_pig,, 0,7,female,small,,Tan,Tiny,Curious,true,false,false,false,false,\
true,,,25.00\n";

        let entries = parse_entries(Cursor::new(data)).expect("parses");
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.shelter, "rescue_haven");
        assert_eq!(entry.attributes.species, Species::GuineaPig);
        assert_eq!(entry.attributes.age_months, 7);
        assert_eq!(entry.attributes.weight, None);
        assert!(entry.attributes.good_with_kids);
        assert!(entry.attributes.is_vaccinated);
        assert_eq!(entry.attributes.adoption_fee, 2_500);
    }

    #[test]
    fn unknown_species_is_a_csv_error() {
        let data = "shelter,name,species,gender,size\nrescue_haven,Rex,dinosaur,male,large\n";
        assert!(parse_entries(Cursor::new(data)).is_err());
    }
}
