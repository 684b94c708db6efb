//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Loan status of a copy, stored as a one letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On Loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" | "maintenance" => Ok(LoanStatus::Maintenance),
            "o" | "on_loan" => Ok(LoanStatus::OnLoan),
            "a" | "available" => Ok(LoanStatus::Available),
            "r" | "reserved" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.trim().parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.code().to_string(), buf)
    }
}

/// Physical copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    /// Unique id for this copy across the whole library
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub borrower_id: Option<i32>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// True when the copy was due back before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.due_back, Some(due_back) if due_back < today)
    }
}

/// Copy joined with the title of its book
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TitledBookInstance {
    #[sqlx(flatten)]
    pub instance: BookInstance,
    pub book_title: String,
}

impl TitledBookInstance {
    pub fn into_details(self, today: NaiveDate) -> BookInstanceDetails {
        BookInstanceDetails::new(self.instance, self.book_title, today)
    }
}

/// Copy with the title of its book and its overdue flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookInstanceDetails {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    pub borrower_id: Option<i32>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub is_overdue: bool,
}

impl BookInstanceDetails {
    pub fn new(instance: BookInstance, book_title: String, today: NaiveDate) -> Self {
        let is_overdue = instance.is_overdue(today);
        BookInstanceDetails {
            id: instance.id,
            book_id: instance.book_id,
            book_title,
            imprint: instance.imprint,
            borrower_id: instance.borrower_id,
            due_back: instance.due_back,
            status: instance.status,
            is_overdue,
        }
    }
}

impl std::fmt::Display for BookInstanceDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.book_title)
    }
}

/// Copy as listed on a public book page: no borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShelfCopy {
    pub id: Uuid,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub is_overdue: bool,
}

impl From<BookInstanceDetails> for ShelfCopy {
    fn from(details: BookInstanceDetails) -> Self {
        Self {
            id: details.id,
            imprint: details.imprint,
            due_back: details.due_back,
            status: details.status,
            is_overdue: details.is_overdue,
        }
    }
}

/// Create book instance request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: i32,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub borrower_id: Option<i32>,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
}

/// Update book instance request
///
/// `borrower_id` and `due_back` can be cleared by sending an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    pub book_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub borrower_id: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_back: Option<Option<NaiveDate>>,
    pub status: Option<LoanStatus>,
}

impl UpdateBookInstance {
    /// Apply the present fields onto an existing copy
    pub fn apply_to(&self, instance: &mut BookInstance) {
        if let Some(book_id) = self.book_id {
            instance.book_id = book_id;
        }
        if let Some(ref imprint) = self.imprint {
            instance.imprint = imprint.clone();
        }
        if let Some(borrower_id) = self.borrower_id {
            instance.borrower_id = borrower_id;
        }
        if let Some(due_back) = self.due_back {
            instance.due_back = due_back;
        }
        if let Some(status) = self.status {
            instance.status = status;
        }
    }
}

/// Renewal request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenewBookInstance {
    /// New due-back date, between today and 4 weeks ahead
    pub due_back: NaiveDate,
}

/// Data needed to show a renewal form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalForm {
    pub book_instance: BookInstanceDetails,
    /// Suggested date (today plus 3 weeks)
    pub proposed_due_back: NaiveDate,
}

/// Status change request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatus {
    pub status: LoanStatus,
}

/// Book instance list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookInstanceQuery {
    pub status: Option<LoanStatus>,
    pub page: Option<i64>,
}
