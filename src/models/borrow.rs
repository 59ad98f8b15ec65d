//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::BookShort;
use super::user::UserShort;

/// Borrow record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub borrowed_at: DateTime<Utc>,
    /// Null while the copy is still out
    pub returned_at: Option<DateTime<Utc>>,
}

/// Lifecycle of a borrow record. A returned record never becomes active
/// again; borrowing the same book later creates a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Active,
    Returned,
}

impl BorrowStatus {
    /// Status implied by a record's return timestamp
    pub fn from_returned_at(returned_at: Option<DateTime<Utc>>) -> Self {
        match returned_at {
            None => BorrowStatus::Active,
            Some(_) => BorrowStatus::Returned,
        }
    }
}

/// Internal row structure for borrow listings joined with book and user
#[derive(Debug, Clone, FromRow)]
pub struct BorrowDetailsRow {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub book_title: String,
    pub book_isbn: String,
    pub username: String,
}

impl From<BorrowDetailsRow> for BorrowDetails {
    fn from(row: BorrowDetailsRow) -> Self {
        BorrowDetails {
            id: row.id,
            borrowed_at: row.borrowed_at,
            returned_at: row.returned_at,
            status: BorrowStatus::from_returned_at(row.returned_at),
            book: BookShort {
                id: row.book_id,
                title: row.book_title,
                isbn: row.book_isbn,
            },
            user: UserShort {
                id: row.user_id,
                username: row.username,
            },
        }
    }
}

/// Borrow record with its book and borrower, for listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    pub id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub book: BookShort,
    pub user: UserShort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_returned_at() {
        assert_eq!(BorrowStatus::from_returned_at(None), BorrowStatus::Active);
        assert_eq!(
            BorrowStatus::from_returned_at(Some(Utc::now())),
            BorrowStatus::Returned
        );
    }

    #[test]
    fn test_details_from_row() {
        let details: BorrowDetails = BorrowDetailsRow {
            id: 9,
            book_id: 3,
            user_id: 4,
            borrowed_at: Utc::now(),
            returned_at: None,
            book_title: "Dune".into(),
            book_isbn: "9780441013593".into(),
            username: "alice".into(),
        }
        .into();

        assert_eq!(details.status, BorrowStatus::Active);
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["book"]["title"], "Dune");
        assert_eq!(json["user"]["username"], "alice");
    }
}
