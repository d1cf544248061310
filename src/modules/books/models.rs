use serde::{de, Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Earliest accepted publication year.
pub const MIN_PUBLISHED_YEAR: i32 = 1000;

/// A catalogue record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Store-assigned identifier, never reused
    #[schema(example = 1)]
    pub id: i64,
    /// Title of the book
    #[schema(example = "1984")]
    pub title: String,
    /// Author of the book
    #[schema(example = "George Orwell")]
    pub author: String,
    /// ISBN, unique across the catalogue
    #[schema(example = "978-0451524935")]
    pub isbn: String,
    /// Year of publication
    #[schema(example = 1949)]
    pub published_year: i32,
    /// Whether the book can currently be borrowed
    pub available: bool,
    /// When the record was created
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime, example = "2024-01-01T10:00:00Z")]
    pub created_at: OffsetDateTime,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookCreate {
    /// Title of the book
    #[validate(length(min = 1, max = 200))]
    #[schema(min_length = 1, max_length = 200, example = "1984")]
    pub title: String,
    /// Author of the book
    #[validate(length(min = 1, max = 100))]
    #[schema(min_length = 1, max_length = 100, example = "George Orwell")]
    pub author: String,
    /// ISBN made of digits and hyphens
    #[validate(custom(function = "validate_isbn"))]
    #[schema(pattern = r"^[0-9-]+$", example = "978-0451524935")]
    pub isbn: String,
    /// Year of publication, between 1000 and the current year
    #[validate(custom(function = "validate_published_year"))]
    #[schema(minimum = 1000, example = 1949)]
    #[serde(deserialize_with = "deserialize_year")]
    pub published_year: i32,
}

/// Request model for a partial update; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookUpdate {
    #[validate(length(min = 1, max = 200))]
    #[schema(min_length = 1, max_length = 200)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100))]
    #[schema(min_length = 1, max_length = 100)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[validate(custom(function = "validate_isbn"))]
    #[schema(pattern = r"^[0-9-]+$")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[validate(custom(function = "validate_published_year"))]
    #[schema(minimum = 1000)]
    #[serde(
        default,
        deserialize_with = "deserialize_optional_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.published_year.is_none()
            && self.available.is_none()
    }

    /// Merge every supplied field into `book`.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(published_year) = self.published_year {
            book.published_year = published_year;
        }
        if let Some(available) = self.available {
            book.available = available;
        }
    }
}

/// Optional filters for listing books; all given filters must match.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookFilter {
    /// Keep only books with this availability; accepts `true/false`,
    /// `1/0`, `yes/no`, `y/n`, `t/f`, `on/off` in any case
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub available: Option<bool>,
    /// Case-insensitive substring of the author name
    pub author: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(available) = self.available {
            if book.available != available {
                return false;
            }
        }

        match self.author.as_deref() {
            Some(author) if !author.is_empty() => book
                .author
                .to_lowercase()
                .contains(&author.to_lowercase()),
            _ => true,
        }
    }
}

pub fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}

/// Parse a query flag the way form-encoded clients spell booleans.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "t" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "f" | "off" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_flag(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid boolean value '{raw}'"))),
    }
}

/// A year given either as a JSON integer or as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum YearInput {
    Number(i32),
    Text(String),
}

impl YearInput {
    fn into_year<E: de::Error>(self) -> Result<i32, E> {
        match self {
            YearInput::Number(year) => Ok(year),
            YearInput::Text(raw) => raw
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid year '{raw}'"))),
        }
    }
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    YearInput::deserialize(deserializer)?.into_year()
}

fn deserialize_optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<YearInput>::deserialize(deserializer)?
        .map(YearInput::into_year)
        .transpose()
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    if !isbn.is_empty() && isbn.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Ok(());
    }

    let mut error = ValidationError::new("isbn_format");
    error.message = Some("ISBN may only contain digits and hyphens".into());
    Err(error)
}

fn validate_published_year(year: i32) -> Result<(), ValidationError> {
    let latest = current_year();
    if (MIN_PUBLISHED_YEAR..=latest).contains(&year) {
        return Ok(());
    }

    let mut error = ValidationError::new("published_year_range");
    error.message = Some(format!("published year must be between {MIN_PUBLISHED_YEAR} and {latest}").into());
    Err(error)
}
