//! Book record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A book the user has read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, assigned at creation.
    pub id: String,

    /// Book title.
    pub title: String,

    /// Author name.
    pub author: String,

    /// Cover image payload (uploaded or generated).
    pub cover_image: String,

    /// Reading month, `YYYY-MM-01`.
    pub month_year: String,

    /// Rating from 1 to 5.
    pub rating: Rating,

    /// Short synopsis.
    pub synopsis: String,

    /// Author photo payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_photo: Option<String>,

    /// Year the book was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<u32>,

    /// RFC 3339 creation timestamp.
    pub date_added: String,
}

impl Book {
    /// Parsed `date_added`, if it is a valid RFC 3339 timestamp.
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date_added)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Star rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating.
    pub const MIN: u8 = 1;
    /// Highest rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside 1..=5.
    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Numeric value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Short verdict shown on gallery cards.
    pub fn label(self) -> &'static str {
        match self.0 {
            5 => "Masterpiece",
            4 => "Excellent",
            3 => "Good Read",
            2 => "Average",
            _ => "Disappointing",
        }
    }

    /// Five-character star strip, filled stars first.
    pub fn stars(self) -> String {
        let filled = self.0 as usize;
        let empty = (Self::MAX - self.0) as usize;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

/// Rating outside 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingOutOfRange(pub u8);

impl fmt::Display for RatingOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rating must be between 1 and 5, got {}", self.0)
    }
}

impl std::error::Error for RatingOutOfRange {}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(RatingOutOfRange(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(6).is_none());
        assert_eq!(Rating::new(3).map(Rating::value), Some(3));
    }

    #[test]
    fn test_rating_labels_and_stars() {
        let rating = Rating::new(4).unwrap();
        assert_eq!(rating.label(), "Excellent");
        assert_eq!(rating.stars(), "★★★★☆");
        assert_eq!(Rating::new(1).unwrap().label(), "Disappointing");
        assert_eq!(Rating::default().label(), "Masterpiece");
    }

    #[test]
    fn test_book_json_field_names() {
        let book = Book {
            id: "1".to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            cover_image: "data:image/png;base64,AA==".to_string(),
            month_year: "2024-03-01".to_string(),
            rating: Rating::new(5).unwrap(),
            synopsis: "Spice.".to_string(),
            author_photo: None,
            publication_year: Some(1965),
            date_added: "2024-03-02T10:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["coverImage"], "data:image/png;base64,AA==");
        assert_eq!(value["monthYear"], "2024-03-01");
        assert_eq!(value["publicationYear"], 1965);
        assert_eq!(value["rating"], 5);
        assert!(value.get("authorPhoto").is_none());
    }

    #[test]
    fn test_book_rejects_out_of_range_rating() {
        let json = r#"{"id":"1","title":"T","author":"A","coverImage":"x",
            "monthYear":"2024-01-01","rating":9,"synopsis":"S","dateAdded":"2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }

    #[test]
    fn test_book_accepts_null_optionals() {
        let json = r#"{"id":"1","title":"T","author":"A","coverImage":"x",
            "monthYear":"2024-01-01","rating":2,"synopsis":"S","authorPhoto":null,
            "publicationYear":null,"dateAdded":"2024-01-01T00:00:00Z"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.author_photo, None);
        assert_eq!(book.publication_year, None);
        assert!(book.added_at().is_some());
    }
}
