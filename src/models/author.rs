//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookSummary;

/// Author as stored in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death (labelled "Died")
    pub date_of_death: Option<NaiveDate>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookSummary>,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request
///
/// Dates can be cleared by sending an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_death: Option<Option<NaiveDate>>,
}

impl UpdateAuthor {
    /// Apply the present fields onto an existing author
    pub fn apply_to(&self, author: &mut Author) {
        if let Some(ref first_name) = self.first_name {
            author.first_name = first_name.clone();
        }
        if let Some(ref last_name) = self.last_name {
            author.last_name = last_name.clone();
        }
        if let Some(date_of_birth) = self.date_of_birth {
            author.date_of_birth = date_of_birth;
        }
        if let Some(date_of_death) = self.date_of_death {
            author.date_of_death = date_of_death;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            id: 1,
            first_name: "John".to_string(),
            last_name: "Kerry".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1943, 12, 11),
            date_of_death: None,
        }
    }

    #[test]
    fn test_display_is_first_name_space_last_name() {
        assert_eq!(author().to_string(), "John Kerry");
    }

    #[test]
    fn test_name_length_limits() {
        let request = CreateAuthor {
            first_name: "x".repeat(101),
            last_name: "Kerry".to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(request.validate().is_err());

        let request = CreateAuthor {
            first_name: "x".repeat(100),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_distinguishes_null_from_missing() {
        let update: UpdateAuthor =
            serde_json::from_str(r#"{"last_name": "Smith", "date_of_birth": null}"#).unwrap();
        let mut a = author();
        update.apply_to(&mut a);
        assert_eq!(a.last_name, "Smith");
        assert_eq!(a.first_name, "John");
        assert_eq!(a.date_of_birth, None);

        let update: UpdateAuthor = serde_json::from_str(r#"{"first_name": "Jack"}"#).unwrap();
        let mut a = author();
        update.apply_to(&mut a);
        assert_eq!(a.date_of_birth, NaiveDate::from_ymd_opt(1943, 12, 11));
    }
}
