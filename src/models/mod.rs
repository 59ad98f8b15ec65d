//! Data models for Shelfmark

pub mod author;
pub mod book;
pub mod borrow;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorShort, AuthorWithBooks};
pub use book::{Book, BookDetails, BookShort};
pub use borrow::{BorrowDetails, BorrowRecord, BorrowStatus};
pub use user::{Role, User, UserClaims, UserShort};
