//! Integration tests. All of them need external services and are ignored by
//! default: run with `cargo test --test integration -- --ignored`.
//!
//! - `api_tests` talks to a server on localhost:8080
//! - `borrow_tests` uses the database at `DATABASE_URL`

mod api_tests;
mod borrow_tests;
