//! The sponsor gallery: a third CSV document of supporter names and
//! images.

use serde::{Deserialize, Serialize};

use crate::itinerary::HeaderIndex;

const NAME_ALIASES: &[&str] = &["name", "sponsor"];
const IMAGE_ALIASES: &[&str] = &["image", "image url"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorRecord {
    pub name: String,
    pub image_url: String,
}

/// Map sponsor rows, dropping rows without a usable name.
#[must_use]
pub fn map_sponsors(header: &[String], rows: &[Vec<String>]) -> Vec<SponsorRecord> {
    let index = HeaderIndex::new(header);

    rows.iter()
        .map(|row| SponsorRecord {
            name: index.field(row, NAME_ALIASES).to_string(),
            image_url: index.field(row, IMAGE_ALIASES).to_string(),
        })
        .filter(|s| !s.name.is_empty() && s.name != "-")
        .collect()
}

#[must_use]
pub fn supporter_label(count: usize) -> String {
    if count == 1 {
        "1 supporter".to_string()
    } else {
        format!("{count} supporters")
    }
}
