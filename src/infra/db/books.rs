use async_trait::async_trait;

use crate::{
    application::repos::{
        BooksRepo, BooksWriteRepo, CreateBookParams, RepoError, UpdateBookParams,
    },
    domain::entities::{BookRecord, CategoryRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    name: String,
    author: String,
    category_id: Option<i64>,
    category_name: Option<String>,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(CategoryRecord { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            author: row.author,
            category,
        }
    }
}

#[async_trait]
impl BooksRepo for PostgresRepositories {
    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.name, b.author, c.id AS category_id, c.name AS category_name
            FROM books b
            LEFT JOIN categories c ON c.id = b.category_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BookRecord::from))
    }

    async fn find_by_name_and_author(
        &self,
        name: &str,
        author: &str,
    ) -> Result<Option<BookRecord>, RepoError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.name, b.author, c.id AS category_id, c.name AS category_name
            FROM books b
            LEFT JOIN categories c ON c.id = b.category_id
            WHERE b.name = $1 AND b.author = $2
            "#,
        )
        .bind(name)
        .bind(author)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(BookRecord::from))
    }

    async fn list_by_category_name(&self, name: &str) -> Result<Vec<BookRecord>, RepoError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.name, b.author, c.id AS category_id, c.name AS category_name
            FROM books b
            INNER JOIN categories c ON c.id = b.category_id
            WHERE c.name = $1
            ORDER BY b.id
            "#,
        )
        .bind(name)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }
}

#[async_trait]
impl BooksWriteRepo for PostgresRepositories {
    async fn create_book(&self, params: CreateBookParams) -> Result<BookRecord, RepoError> {
        let CreateBookParams {
            name,
            author,
            category_name,
        } = params;

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let category = Self::get_or_create_category(&mut tx, &category_name).await?;

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            WITH inserted AS (
                INSERT INTO books (name, author, category_id)
                VALUES ($1, $2, $3)
                RETURNING id, name, author, category_id
            )
            SELECT i.id, i.name, i.author, c.id AS category_id, c.name AS category_name
            FROM inserted i
            LEFT JOIN categories c ON c.id = i.category_id
            "#,
        )
        .bind(name)
        .bind(author)
        .bind(category.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_book(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError> {
        let UpdateBookParams {
            id,
            name,
            author,
            category_name,
        } = params;

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let category_id = match category_name.as_deref() {
            Some(category_name) => Some(
                Self::get_or_create_category(&mut tx, category_name)
                    .await?
                    .id,
            ),
            None => None,
        };

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            WITH updated AS (
                UPDATE books
                SET name = $2, author = $3, category_id = COALESCE($4, category_id)
                WHERE id = $1
                RETURNING id, name, author, category_id
            )
            SELECT u.id, u.name, u.author, c.id AS category_id, c.name AS category_name
            FROM updated u
            LEFT JOIN categories c ON c.id = u.category_id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(author)
        .bind(category_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        // Dropping `tx` without commit rolls back a category created above.
        let Some(row) = row else {
            return Err(RepoError::NotFound);
        };

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_book(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
