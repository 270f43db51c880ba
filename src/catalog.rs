// Catalog record types for the three published sheets: tours, villas and
// experiences. The row boundary is strict: a row missing a required column
// (or carrying the wrong type) is rejected rather than passed through.

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A bookable guided tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourRecord {
    pub id: u32,
    pub title: String,
    pub location: String,
    pub duration: String,
    pub group_size: String,
    pub price: f64,
    pub rating: f64,
    pub reviews: u32,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub category: String,
}

/// A bookable property, priced per night.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VillaRecord {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub price: f64,
    pub rating: f64,
    pub beds: u32,
    pub baths: u32,
    pub sqft: u32,
    pub image: String,
    #[serde(default, deserialize_with = "comma_list")]
    pub amenities: Vec<String>,
    pub featured: bool,
}

/// A browsable experience. Listed on the site but not bookable through the
/// wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRecord {
    pub id: u32,
    pub category: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub group_size: String,
    pub price: f64,
    pub rating: f64,
    pub image: String,
}

// Sheet cells hold amenities as one comma-joined string; JSON holds a list.
// Accept both.
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ListOrString;

    impl<'de> Visitor<'de> for ListOrString {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a list of strings or a comma-separated string")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                items.push(item);
            }
            Ok(items)
        }
    }

    deserializer.deserialize_any(ListOrString)
}
