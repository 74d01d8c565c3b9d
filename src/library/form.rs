//! Add-book form input and validation.

use crate::library::book::{Book, Rating};
use crate::library::month::normalize_month;
use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Earliest accepted publication year.
pub const MIN_PUBLICATION_YEAR: i64 = 1000;

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Book title.
    Title,
    /// Author name.
    Author,
    /// Reading month.
    MonthYear,
    /// Star rating.
    Rating,
    /// Synopsis text.
    Synopsis,
    /// Publication year.
    PublicationYear,
    /// Uploaded cover file.
    CoverImage,
}

impl Field {
    /// Field name as used in forms and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::MonthYear => "monthYear",
            Field::Rating => "rating",
            Field::Synopsis => "synopsis",
            Field::PublicationYear => "publicationYear",
            Field::CoverImage => "coverImage",
        }
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    /// Record a message for `field`, keeping the first one.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, msg)| format!("{}: {}", field.as_str(), msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, msg) in self.iter() {
            map.serialize_entry(field.as_str(), msg)?;
        }
        map.end()
    }
}

/// Raw add-book input, exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookForm {
    /// Title text.
    pub title: String,
    /// Author text.
    pub author: String,
    /// Selected month, `YYYY-MM-DD` or `YYYY-MM`.
    pub month_year: String,
    /// Rating as entered.
    pub rating: String,
    /// Synopsis text.
    pub synopsis: String,
    /// Publication year as entered; blank means unknown.
    pub publication_year: String,
    /// Optional author photo payload.
    pub author_photo: Option<String>,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            month_year: String::new(),
            rating: Rating::default().to_string(),
            synopsis: String::new(),
            publication_year: String::new(),
            author_photo: None,
        }
    }
}

/// Validated book fields, everything but the cover, id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub month_year: String,
    pub rating: Rating,
    pub synopsis: String,
    pub publication_year: Option<u32>,
    pub author_photo: Option<String>,
}

impl BookForm {
    /// Check every field against `today`, collecting all failures.
    pub fn validate(&self, today: NaiveDate) -> Result<BookDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add(Field::Title, "Title is required");
        }

        let author = self.author.trim();
        if author.is_empty() {
            errors.add(Field::Author, "Author is required");
        }

        let month_year = if self.month_year.trim().is_empty() {
            errors.add(Field::MonthYear, "Month of reading is required");
            None
        } else {
            let normalized = normalize_month(&self.month_year);
            if normalized.is_none() {
                errors.add(Field::MonthYear, "Please select a valid month");
            }
            normalized
        };

        let rating = self
            .rating
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(Rating::new);
        if rating.is_none() {
            errors.add(Field::Rating, "Rating must be between 1 and 5");
        }

        let synopsis = self.synopsis.trim();
        if synopsis.is_empty() {
            errors.add(Field::Synopsis, "Synopsis is required");
        }

        let publication_year = match self.publication_year.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(year) if (MIN_PUBLICATION_YEAR..=today.year() as i64).contains(&year) => {
                    Some(year as u32)
                }
                _ => {
                    errors.add(Field::PublicationYear, "Please enter a valid year");
                    None
                }
            },
        };

        let author_photo = self
            .author_photo
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        match (month_year, rating) {
            (Some(month_year), Some(rating)) if errors.is_empty() => Ok(BookDraft {
                title: title.to_string(),
                author: author.to_string(),
                month_year,
                rating,
                synopsis: synopsis.to_string(),
                publication_year,
                author_photo,
            }),
            _ => Err(errors),
        }
    }
}

impl BookDraft {
    /// Complete the record with its identity, cover and creation time.
    pub fn into_book(self, id: String, cover_image: String, date_added: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            cover_image,
            month_year: self.month_year,
            rating: self.rating,
            synopsis: self.synopsis,
            author_photo: self.author_photo,
            publication_year: self.publication_year,
            date_added,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn valid_form() -> BookForm {
        BookForm {
            title: "  The Hobbit ".to_string(),
            author: "J. R. R. Tolkien".to_string(),
            month_year: "2025-05".to_string(),
            rating: "4".to_string(),
            synopsis: "There and back again.".to_string(),
            publication_year: "1937".to_string(),
            author_photo: None,
        }
    }

    #[test]
    fn test_valid_form_is_normalized() {
        let draft = valid_form().validate(today()).unwrap();
        assert_eq!(draft.title, "The Hobbit");
        assert_eq!(draft.month_year, "2025-05-01");
        assert_eq!(draft.rating.value(), 4);
        assert_eq!(draft.publication_year, Some(1937));
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let form = BookForm::default();
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(errors.get(Field::Title), Some("Title is required"));
        assert_eq!(errors.get(Field::Author), Some("Author is required"));
        assert_eq!(
            errors.get(Field::MonthYear),
            Some("Month of reading is required")
        );
        assert_eq!(errors.get(Field::Synopsis), Some("Synopsis is required"));
        assert_eq!(errors.get(Field::Rating), None);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_rating_outside_range_rejected() {
        for raw in ["0", "6", "-1", "4.5", "five", ""] {
            let form = BookForm {
                rating: raw.to_string(),
                ..valid_form()
            };
            let errors = form.validate(today()).unwrap_err();
            assert_eq!(
                errors.get(Field::Rating),
                Some("Rating must be between 1 and 5"),
                "rating {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_publication_year_bounds() {
        let with_year = |year: &str| BookForm {
            publication_year: year.to_string(),
            ..valid_form()
        };

        assert!(with_year("999").validate(today()).is_err());
        assert!(with_year("2026").validate(today()).is_err());
        assert!(with_year("abc").validate(today()).is_err());
        assert_eq!(
            with_year("2025").validate(today()).unwrap().publication_year,
            Some(2025)
        );
        assert_eq!(
            with_year("  ").validate(today()).unwrap().publication_year,
            None
        );
    }

    #[test]
    fn test_invalid_month_rejected() {
        let form = BookForm {
            month_year: "sometime".to_string(),
            ..valid_form()
        };
        let errors = form.validate(today()).unwrap_err();
        assert_eq!(
            errors.get(Field::MonthYear),
            Some("Please select a valid month")
        );
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let errors = BookForm::default().validate(today()).unwrap_err();
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["monthYear"], "Month of reading is required");
        assert_eq!(value["title"], "Title is required");
    }
}
