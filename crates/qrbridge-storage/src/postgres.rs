use async_trait::async_trait;
use jiff::Timestamp;
use qrbridge_core::error::{Result, StorageError};
use qrbridge_core::repository::{GroupRepository, MappingRepository, ReadRepository};
use qrbridge_core::{Group, Mapping, MappingId, NewMapping, RandomLink};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Columns selected for every mapping read. `created_at` is handed over as
/// microseconds since the Unix epoch so it can be decoded into a [`Timestamp`].
const MAPPING_COLUMNS: &str = r#"
    id,
    random_link,
    website_link,
    group_name,
    (EXTRACT(EPOCH FROM created_at) * 1000000)::BIGINT AS created_at_us
"#;

/// PostgreSQL implementation of the repository contract.
///
/// Tables are `mappings` and `groups`; `mappings.group_name` references a
/// group by name without a foreign key, so deleting a group's mappings is the
/// caller's job.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a repository from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new connection pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Operation(format!("migration failed: {e}")))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_created_at(micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", micros))
    })
}

fn mapping_from_row(row: &PgRow) -> Result<Mapping> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let random_link: String = row.try_get("random_link").map_err(map_sqlx_error)?;
    let website_link: String = row.try_get("website_link").map_err(map_sqlx_error)?;
    let group_name: Option<String> = row.try_get("group_name").map_err(map_sqlx_error)?;
    let created_at_us: i64 = row.try_get("created_at_us").map_err(map_sqlx_error)?;

    Ok(Mapping {
        id: MappingId::new(id),
        random_link: RandomLink::new_unchecked(random_link),
        website_link,
        group_name,
        created_at: parse_created_at(created_at_us)?,
    })
}

fn group_from_row(row: &PgRow) -> Result<Group> {
    Ok(Group {
        name: row.try_get("name").map_err(map_sqlx_error)?,
        image_url: row.try_get("image_url").map_err(map_sqlx_error)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for PostgresRepository {
    async fn find_destination(&self, link: &RandomLink) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT website_link
            FROM mappings
            WHERE random_link = $1
            LIMIT 1
            "#,
        )
        .bind(link.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| row.try_get("website_link").map_err(map_sqlx_error))
            .transpose()
    }

    async fn probe(&self) -> Result<Option<MappingId>> {
        let row = sqlx::query("SELECT id FROM mappings LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|row| {
            row.try_get::<i64, _>("id")
                .map(MappingId::new)
                .map_err(map_sqlx_error)
        })
        .transpose()
    }
}

#[async_trait]
impl MappingRepository for PostgresRepository {
    async fn list_mappings(&self) -> Result<Vec<Mapping>> {
        let rows = sqlx::query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM mappings ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(mapping_from_row).collect()
    }

    async fn get_mapping(&self, id: MappingId) -> Result<Option<Mapping>> {
        let row = sqlx::query(&format!(
            "SELECT {MAPPING_COLUMNS} FROM mappings WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(mapping_from_row).transpose()
    }

    async fn insert_mapping(&self, new: NewMapping) -> Result<Mapping> {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO mappings (random_link, website_link, group_name)
            VALUES ($1, $2, $3)
            RETURNING {MAPPING_COLUMNS}
            "#
        ))
        .bind(new.random_link.as_str())
        .bind(&new.website_link)
        .bind(new.group_name.as_deref())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                let mapping = mapping_from_row(&row)?;
                debug!(id = %mapping.id, random_link = %mapping.random_link, "inserted mapping");
                Ok(mapping)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(new.random_link.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update_destination(&self, id: MappingId, website_link: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE mappings SET website_link = $1 WHERE id = $2")
            .bind(website_link)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_group(&self, id: MappingId, group_name: Option<&str>) -> Result<bool> {
        let result = sqlx::query("UPDATE mappings SET group_name = $1 WHERE id = $2")
            .bind(group_name)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_mapping(&self, id: MappingId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM mappings WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_mappings_in_group(&self, group_name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM mappings WHERE group_name = $1")
            .bind(group_name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl GroupRepository for PostgresRepository {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query("SELECT name, image_url FROM groups ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(group_from_row).collect()
    }

    async fn get_group(&self, name: &str) -> Result<Option<Group>> {
        let row = sqlx::query("SELECT name, image_url FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(group_from_row).transpose()
    }

    async fn insert_group(&self, group: Group) -> Result<()> {
        let result = sqlx::query("INSERT INTO groups (name, image_url) VALUES ($1, $2)")
            .bind(&group.name)
            .bind(group.image_url.as_deref())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(group.name)),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete_group(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
