//! Borrowing against a real database

use shelfmark::{
    config::AuthConfig,
    error::AppError,
    models::{
        author::CreateAuthor,
        book::{CreateBook, UpdateBook},
        borrow::BorrowStatus,
        user::{RegisterRequest, Role, User},
    },
    repository::Repository,
    services::{password::hash_password, Services},
};
use sqlx::postgres::PgPoolOptions;

async fn setup() -> Services {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let auth = AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        jwt_expiration_hours: 1,
        protect_catalog: false,
    };
    Services::new(Repository::new(pool), auth)
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn create_user(services: &Services) -> User {
    let name = unique("borrower");
    services
        .repository
        .users
        .create(&name, &format!("{}@example.org", name), &hash_password("pw"), Role::User)
        .await
        .expect("Failed to create user")
}

async fn create_book(services: &Services, title: &str, copies: i32) -> i32 {
    let author = services
        .authors
        .create_author(CreateAuthor {
            name: "A".to_string(),
            bio: Some("b".to_string()),
        })
        .await
        .expect("Failed to create author");

    services
        .catalog
        .create_book(CreateBook {
            title: title.to_string(),
            isbn: String::new(),
            published_date: None,
            total_copies: copies,
            copies_available: copies,
            author_id: author.id,
        })
        .await
        .expect("Failed to create book")
        .id
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_scenario() {
    let services = setup().await;
    let book_id = create_book(&services, &unique("T1"), 2).await;
    let first = create_user(&services).await;
    let second = create_user(&services).await;
    let third = create_user(&services).await;

    let (_, book) = services.loans.borrow_book(book_id, first.id).await.unwrap();
    assert_eq!(book.copies_available, 1);

    let (_, book) = services.loans.borrow_book(book_id, second.id).await.unwrap();
    assert_eq!(book.copies_available, 0);
    assert!(!book.is_available);

    let err = services.loans.borrow_book(book_id, third.id).await.unwrap_err();
    assert!(matches!(err, AppError::Unavailable(_)));

    let (record, book) = services.loans.return_book(book_id, first.id).await.unwrap();
    assert_eq!(book.copies_available, 1);
    assert!(record.returned_at.is_some());

    // Nothing left to return for this user
    let err = services.loans.return_book(book_id, first.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let history = services.loans.list_borrowed_by_user(first.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_never_oversell() {
    let services = setup().await;
    let book_id = create_book(&services, &unique("contended"), 3).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let user = create_user(&services).await;
        let services = services.clone();
        handles.push(tokio::spawn(async move {
            services.loans.borrow_book(book_id, user.id).await
        }));
    }

    let mut borrowed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => borrowed += 1,
            Err(AppError::Unavailable(_)) | Err(AppError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(borrowed, 3);

    let book = services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.book.copies_available, 0);
    assert_eq!(book.book.total_copies, 3);
}

#[tokio::test]
#[ignore]
async fn test_book_rules_with_active_borrows() {
    let services = setup().await;
    let title = unique("guarded");
    let book_id = create_book(&services, &title, 2).await;
    let user = create_user(&services).await;

    services.loans.borrow_book(book_id, user.id).await.unwrap();

    let details = services.catalog.get_book(book_id).await.unwrap();
    let err = services
        .catalog
        .update_book(
            book_id,
            UpdateBook {
                title: title.clone(),
                isbn: String::new(),
                published_date: None,
                total_copies: 2,
                copies_available: 2,
                author_id: details.author.id,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = services.catalog.delete_book(book_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = services.authors.delete_author(details.author.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert_eq!(services.catalog.total_copies_by_title(&title.to_uppercase()).await.unwrap(), 2);

    services.loans.return_book(book_id, user.id).await.unwrap();
    services.catalog.delete_book(book_id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_unknown_rows() {
    let services = setup().await;
    let user = create_user(&services).await;
    let book_id = create_book(&services, &unique("known"), 1).await;

    let err = services.loans.borrow_book(i32::MAX, user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services.loans.borrow_book(book_id, i32::MAX).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services.loans.return_book(i32::MAX, user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Failed attempts leave the copy on the shelf
    let book = services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.book.copies_available, 1);
}

#[tokio::test]
#[ignore]
async fn test_return_onto_full_shelf_rolls_back() {
    let services = setup().await;
    let book_id = create_book(&services, &unique("full"), 2).await;
    let user = create_user(&services).await;

    let (_, book) = services.loans.borrow_book(book_id, user.id).await.unwrap();
    assert_eq!(book.copies_available, 1);

    // Count drifted back to total behind the record's back
    sqlx::query("UPDATE books SET copies_available = total_copies WHERE id = $1")
        .bind(book_id)
        .execute(&services.repository.pool)
        .await
        .unwrap();

    let err = services
        .repository
        .borrows
        .return_book(book_id, user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let book = services.catalog.get_book(book_id).await.unwrap();
    assert_eq!(book.book.copies_available, 2);

    let history = services.loans.list_borrowed_by_user(user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, BorrowStatus::Active);
    assert!(history[0].returned_at.is_none());
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email_with_new_username() {
    let services = setup().await;
    let name = unique("reader");
    let email = format!("{}@example.org", name);

    services
        .users
        .register(RegisterRequest {
            username: name.clone(),
            email: email.clone(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    let err = services
        .users
        .register(RegisterRequest {
            username: format!("{}_other", name),
            email: email.to_uppercase(),
            password: "secret".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));
}
