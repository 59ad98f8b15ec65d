//! Author model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Author row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub bio: String,
}

/// Author with the books they wrote
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorWithBooks {
    pub id: i32,
    pub name: String,
    pub bio: String,
    pub books: Vec<Book>,
}

impl AuthorWithBooks {
    pub fn new(author: Author, books: Vec<Book>) -> Self {
        Self {
            id: author.id,
            name: author.name,
            bio: author.bio,
            books,
        }
    }
}

/// Short author representation embedded in book listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorShort {
    pub id: i32,
    pub name: String,
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 255, message = "Author name is required"))]
    pub name: String,
    pub bio: Option<String>,
}

/// Update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 255, message = "Author name cannot be empty"))]
    pub name: Option<String>,
    pub bio: Option<String>,
}

impl CreateAuthor {
    /// Trim the name before validation
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            bio: self.bio,
        }
    }
}

impl UpdateAuthor {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|name| name.trim().to_string()),
            bio: self.bio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected_after_trim() {
        let author = CreateAuthor {
            name: "   ".into(),
            bio: None,
        }
        .normalized();
        assert_eq!(author.name, "");
        assert!(author.validate().is_err());

        let update = UpdateAuthor {
            name: Some(" \t ".into()),
            bio: None,
        }
        .normalized();
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_name_trimmed_and_absent_fields_kept() {
        let author = CreateAuthor {
            name: "  Ursula K. Le Guin ".into(),
            bio: Some(" kept as is ".into()),
        }
        .normalized();
        assert_eq!(author.name, "Ursula K. Le Guin");
        assert_eq!(author.bio.as_deref(), Some(" kept as is "));
        assert!(author.validate().is_ok());

        let update = UpdateAuthor { name: None, bio: None }.normalized();
        assert!(update.name.is_none());
        assert!(update.validate().is_ok());
    }
}
