//! The emergency-contacts directory: a second CSV document of people and
//! hotlines, grouped by category for the shell.

use serde::{Deserialize, Serialize};

use crate::itinerary::HeaderIndex;

const NAME_ALIASES: &[&str] = &["name"];
const PHONE_ALIASES: &[&str] = &["phone number", "phone"];
const TELEGRAM_ALIASES: &[&str] = &["telegram"];
const DESCRIPTION_ALIASES: &[&str] = &["description"];
const IMAGE_ALIASES: &[&str] = &["image", "photo"];
const CATEGORY_ALIASES: &[&str] = &["category"];

pub const FALLBACK_CATEGORY: &str = "Other";
/// This category always sorts first in the directory.
pub const PRIORITY_CATEGORY: &str = "Emergency";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    pub phone: String,
    pub telegram: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
}

impl ContactRecord {
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }

    #[must_use]
    pub fn category_or_fallback(&self) -> &str {
        if self.category.is_empty() {
            FALLBACK_CATEGORY
        } else {
            &self.category
        }
    }
}

/// Map contact rows. Unlike the itinerary mapper, rows shorter than the
/// header row are skipped entirely (this document's historical contract).
#[must_use]
pub fn map_contacts(header: &[String], rows: &[Vec<String>]) -> Vec<ContactRecord> {
    let index = HeaderIndex::new(header);

    rows.iter()
        .filter(|row| row.len() >= header.len())
        .map(|row| ContactRecord {
            name: index.field(row, NAME_ALIASES).to_string(),
            phone: index.field(row, PHONE_ALIASES).to_string(),
            telegram: index.field(row, TELEGRAM_ALIASES).to_string(),
            description: index.field(row, DESCRIPTION_ALIASES).to_string(),
            image_url: index.field(row, IMAGE_ALIASES).to_string(),
            category: index.field(row, CATEGORY_ALIASES).to_string(),
        })
        .collect()
}

/// Normalize a phone cell for display: separators stripped, `+` numbers
/// kept international, everything else given the local `0` prefix.
#[must_use]
pub fn format_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '/')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.starts_with('+') || cleaned.starts_with('0') {
        Some(cleaned)
    } else {
        Some(format!("0{cleaned}"))
    }
}

#[must_use]
pub fn tel_link(raw: &str) -> Option<String> {
    format_phone(raw).map(|p| format!("tel:{p}"))
}

/// `@handle` display form for a Telegram cell.
#[must_use]
pub fn telegram_handle(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_start_matches('@').trim();
    (!cleaned.is_empty()).then(|| format!("@{cleaned}"))
}

#[must_use]
pub fn telegram_link(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_start_matches('@').trim();
    (!cleaned.is_empty()).then(|| format!("https://t.me/{cleaned}"))
}

/// Group contacts by category, preserving row order within each group.
/// Categories sort with [`PRIORITY_CATEGORY`] first, then alphabetically.
#[must_use]
pub fn group_by_category(contacts: &[ContactRecord]) -> Vec<(String, Vec<ContactRecord>)> {
    let mut groups: Vec<(String, Vec<ContactRecord>)> = Vec::new();

    for contact in contacts {
        let category = contact.category_or_fallback();
        match groups.iter_mut().find(|(name, _)| name == category) {
            Some((_, members)) => members.push(contact.clone()),
            None => groups.push((category.to_string(), vec![contact.clone()])),
        }
    }

    groups.sort_by(|(a, _), (b, _)| {
        let rank = |name: &str| usize::from(name != PRIORITY_CATEGORY);
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });
    groups
}
