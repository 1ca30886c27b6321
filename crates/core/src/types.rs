use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Menu section a dish belongs to
///
/// The set is closed: adding a label is a schema change, not a content change.
/// Declaration order is the order sections appear on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Entradas,
    Charolas,
    Arroces,
    Naturales,
    Empanizados,
    Horneados,
    Bebidas,
    Extras,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Entradas,
        Category::Charolas,
        Category::Arroces,
        Category::Naturales,
        Category::Empanizados,
        Category::Horneados,
        Category::Bebidas,
        Category::Extras,
    ];

    /// Labels accepted in front-matter, in menu order
    pub const LABELS: [&'static str; 8] = [
        "Entradas",
        "Charolas",
        "Arroces",
        "Naturales",
        "Empanizados",
        "Horneados",
        "Bebidas",
        "Extras",
    ];

    pub fn as_str(&self) -> &'static str {
        Self::LABELS[*self as usize]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-sensitive: "entradas" is not a category
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LABELS
            .iter()
            .position(|label| *label == s)
            .map(|idx| Self::ALL[idx])
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// A dish on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub title: String,
    pub category: Category,
    pub price: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    /// 0 (mild) to 3 (hot)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spicy_level: Option<u8>,
    pub published: bool,
}

impl MenuItem {
    /// Whether the page renderer should show this dish
    pub fn is_visible(&self) -> bool {
        self.published
    }
}

/// A time-boxed promotion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Special {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub featured: bool,
}

impl Special {
    /// Both ends of the range are inclusive
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Discount against the regular price, if the special advertises one
    pub fn savings(&self) -> Option<f64> {
        match (self.price, self.regular_price) {
            (Some(price), Some(regular)) if regular > price => Some(regular - price),
            _ => None,
        }
    }
}

/// Opening hours for one day of the week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub day: String,
    pub open: String,
    pub close: String,
    pub closed: bool,
}

/// Weekly opening hours (hours.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hours {
    pub hours: Vec<DayHours>,
}

/// Restaurant contact card (contact.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

/// One validated file from a content collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry<T> {
    /// Path relative to the collection directory, with forward slashes
    pub id: String,
    pub slug: String,
    /// Text after the front-matter block, untouched
    pub body: String,
    pub data: T,
}

impl<T> ContentEntry<T> {
    pub fn new(id: impl Into<String>, body: impl Into<String>, data: T) -> Self {
        let id = id.into();
        let slug = slugify(&id);
        Self {
            id,
            slug,
            body: body.into(),
            data,
        }
    }
}

/// Get a URL-safe slug from an entry id
///
/// Drops the file extension, lowercases, and turns whitespace into dashes.
/// Directory separators are kept so nested entries stay unique.
pub fn slugify(id: &str) -> String {
    let stem = match id.rfind('.') {
        Some(dot) if !id[dot..].contains('/') => &id[..dot],
        _ => id,
    };

    stem.to_lowercase()
        .replace(char::is_whitespace, "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '/')
        .collect()
}

/// Helper to format a price for display
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}
