use std::sync::Arc;

use sqlx::PgPool;

use bookstore::application::books::BookService;
use bookstore::application::repos::{
    BooksRepo, BooksWriteRepo, CreateBookParams, HealthRepo, RepoError, UpdateBookParams,
};
use bookstore::cache::{CacheConfig, MemoryCacheStore, QueryCache};
use bookstore::domain::entities::NewBook;
use bookstore::infra::db::PostgresRepositories;

fn repos(pool: PgPool) -> Arc<PostgresRepositories> {
    Arc::new(PostgresRepositories::new(pool))
}

fn new_book(name: &str, author: &str, category: &str) -> CreateBookParams {
    CreateBookParams {
        name: name.to_string(),
        author: author.to_string(),
        category_name: category.to_string(),
    }
}

async fn insert(repos: &PostgresRepositories, name: &str, author: &str, category: &str) -> i64 {
    repos
        .create_book(new_book(name, author, category))
        .await
        .expect("create book")
        .id
}

async fn category_count(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("count")
}

#[sqlx::test(migrations = "./migrations")]
async fn create_and_find_book_with_category(pool: PgPool) {
    let repos = repos(pool);
    let id = insert(&repos, "Dune", "Herbert", "sci-fi").await;

    let by_id = repos.find_by_id(id).await.expect("query").expect("row");
    let by_name = repos
        .find_by_name_and_author("Dune", "Herbert")
        .await
        .expect("query")
        .expect("row");

    assert_eq!(by_id, by_name);
    assert_eq!(by_id.category_name(), Some("sci-fi"));
    assert!(repos.find_by_id(id + 1).await.expect("query").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn books_in_same_category_share_one_row(pool: PgPool) {
    let repos = repos(pool.clone());

    let first = repos
        .create_book(new_book("Kind of Blue", "Davis", "music"))
        .await
        .expect("first");
    let second = repos
        .create_book(new_book("A Love Supreme", "Coltrane", "music"))
        .await
        .expect("second");

    assert_eq!(first.category, second.category);
    assert_eq!(category_count(&pool, "music").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_writes_into_new_category_yield_one_row(pool: PgPool) {
    let repos = repos(pool.clone());

    let (left, right) = tokio::join!(
        repos.create_book(new_book("Blue Train", "Coltrane", "jazz")),
        repos.create_book(new_book("Mingus Ah Um", "Mingus", "jazz")),
    );

    assert_eq!(
        left.expect("left").category,
        right.expect("right").category
    );
    assert_eq!(category_count(&pool, "jazz").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_by_category_is_ordered_and_scoped(pool: PgPool) {
    let repos = repos(pool);
    let first = insert(&repos, "Kind of Blue", "Davis", "music").await;
    insert(&repos, "Open", "Agassi", "sport").await;
    let second = insert(&repos, "A Love Supreme", "Coltrane", "music").await;

    let music = repos.list_by_category_name("music").await.expect("list");
    let ids: Vec<i64> = music.iter().map(|book| book.id).collect();

    assert_eq!(ids, vec![first, second]);
    assert!(
        repos
            .list_by_category_name("poetry")
            .await
            .expect("list")
            .is_empty()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_pair_violates_unique_constraint(pool: PgPool) {
    let repos = repos(pool);
    insert(&repos, "Dune", "Herbert", "sci-fi").await;

    let err = repos
        .create_book(new_book("Dune", "Herbert", "classics"))
        .await
        .expect_err("duplicate");

    match err {
        RepoError::Duplicate { constraint } => assert_eq!(constraint, "books_name_author_key"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn rejected_create_rolls_back_new_category(pool: PgPool) {
    let repos = repos(pool.clone());
    insert(&repos, "Dune", "Herbert", "sci-fi").await;

    repos
        .create_book(new_book("Dune", "Herbert", "classics"))
        .await
        .expect_err("duplicate");

    assert_eq!(category_count(&pool, "classics").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_replaces_columns(pool: PgPool) {
    let repos = repos(pool);
    let id = insert(&repos, "Open", "Agassi", "sport").await;

    let updated = repos
        .update_book(UpdateBookParams {
            id,
            name: "Open".to_string(),
            author: "Andre Agassi".to_string(),
            category_name: None,
        })
        .await
        .expect("update");
    assert_eq!(updated.author, "Andre Agassi");
    assert_eq!(updated.category_name(), Some("sport"));

    let moved = repos
        .update_book(UpdateBookParams {
            id,
            name: "Open".to_string(),
            author: "Andre Agassi".to_string(),
            category_name: Some("memoir".to_string()),
        })
        .await
        .expect("move");
    assert_eq!(moved.category_name(), Some("memoir"));
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_update_rolls_back_new_category(pool: PgPool) {
    let repos = repos(pool.clone());
    insert(&repos, "Dune", "Herbert", "sci-fi").await;
    let id = insert(&repos, "Solaris", "Lem", "sci-fi").await;

    let duplicate = repos
        .update_book(UpdateBookParams {
            id,
            name: "Dune".to_string(),
            author: "Herbert".to_string(),
            category_name: Some("classics".to_string()),
        })
        .await
        .expect_err("duplicate pair");
    assert!(matches!(duplicate, RepoError::Duplicate { .. }));

    let missing = repos
        .update_book(UpdateBookParams {
            id: id + 100,
            name: "x".to_string(),
            author: "y".to_string(),
            category_name: Some("classics".to_string()),
        })
        .await
        .expect_err("missing row");
    assert!(matches!(missing, RepoError::NotFound));

    assert_eq!(category_count(&pool, "classics").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_removes_row_once(pool: PgPool) {
    let repos = repos(pool);
    let id = insert(&repos, "Dune", "Herbert", "sci-fi").await;

    repos.delete_book(id).await.expect("delete");

    assert!(repos.find_by_id(id).await.expect("query").is_none());
    assert!(matches!(
        repos.delete_book(id).await.expect_err("already gone"),
        RepoError::NotFound
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_category_detaches_books(pool: PgPool) {
    let repos = repos(pool.clone());
    let id = insert(&repos, "Dune", "Herbert", "sci-fi").await;

    sqlx::query("DELETE FROM categories WHERE name = 'sci-fi'")
        .execute(&pool)
        .await
        .expect("delete category");

    let book = repos.find_by_id(id).await.expect("query").expect("row");
    assert!(book.category.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn health_check_pings_database(pool: PgPool) {
    let repos = repos(pool);
    repos.ping().await.expect("database reachable");
}

#[sqlx::test(migrations = "./migrations")]
async fn service_round_trip_against_postgres(pool: PgPool) {
    let repos = repos(pool);
    let store = Arc::new(MemoryCacheStore::new(&CacheConfig::default()));
    let service = BookService::new(repos.clone(), repos.clone(), QueryCache::new(store));

    let created = service
        .save(
            NewBook {
                name: "Solaris".to_string(),
                author: "Lem".to_string(),
            },
            "sci-fi",
        )
        .await
        .expect("save");
    let fetched = service.find_by_id(created.id).await.expect("find");

    assert_eq!(fetched, created);

    service.delete_by_id(created.id).await.expect("delete");
    assert!(repos.find_by_id(created.id).await.expect("query").is_none());
}
