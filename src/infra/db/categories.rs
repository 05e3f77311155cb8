use sqlx::{Postgres, Transaction};

use crate::{application::repos::RepoError, domain::entities::CategoryRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

impl PostgresRepositories {
    /// Return the category called `name`, inserting it first when missing.
    ///
    /// Runs inside the caller's transaction so the row disappears again when
    /// the book write that needed it is rolled back.
    pub(super) async fn get_or_create_category(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<CategoryRecord, RepoError> {
        // A racing insert of the same name blocks here until the other
        // transaction finishes; the select then sees the committed row.
        sqlx::query(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .execute(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name
            FROM categories
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_one(tx.as_mut())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}
