//! Postgres-backed catalog and order stores.
//!
//! Expected schema (provisioned out-of-band):
//!
//! ```sql
//! CREATE TABLE lessons (
//!     id          UUID PRIMARY KEY,
//!     subject     TEXT NOT NULL,
//!     location    TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     price       DOUBLE PRECISION NOT NULL CHECK (price >= 0),
//!     spaces      BIGINT NOT NULL CHECK (spaces >= 0),
//!     version     BIGINT NOT NULL DEFAULT 1
//! );
//!
//! CREATE TABLE orders (
//!     id         UUID PRIMARY KEY,
//!     items      JSONB NOT NULL,
//!     name       TEXT NOT NULL,
//!     phone      TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL
//! );
//! ```
//!
//! ## Conditional updates
//!
//! `conditional_update` is a single `UPDATE … WHERE … RETURNING` statement:
//! the version precondition, the `spaces + delta >= 0` floor and the write are
//! evaluated together under the row lock, so two concurrent decrements can
//! never both pass the floor. When no row comes back, a follow-up read
//! classifies the refusal (missing, stale version, insufficient spaces). If
//! the row moved in between, the refusal is reported as a version mismatch
//! whatever the expectation was, and the mutator retries.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | `PoolTimedOut`, `PoolClosed`, `Io`, `Tls` | `Unavailable` |
//! | `Database` check violation (`23514`) | `InvalidRecord` |
//! | row decode failures | `InvalidRecord` |
//! | anything else | `Backend` |

use std::sync::Arc;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;
use uuid::Uuid;

use lessonbook_catalog::{FieldPredicate, Lesson, LessonFilter, NewLesson, SpacesRejection};
use lessonbook_core::{ExpectedVersion, LessonId, OrderId};
use lessonbook_orders::NewOrder;

use super::r#trait::{CatalogStore, OrderStore, SpacesUpdate, StoreError, UpdateOutcome};

const LESSON_COLUMNS: &str = "id, subject, location, description, price, spaces, version";

/// Open a lazily-connecting pool; the first query establishes connections.
pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(database_url)
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Postgres-backed lesson store.
///
/// Uses the SQLx connection pool, which is thread-safe (Arc + Send + Sync) and
/// shared by every request.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Classify why the conditional `UPDATE` matched no row.
    async fn explain_refusal(
        &self,
        id: LessonId,
        update: SpacesUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let row = sqlx::query("SELECT spaces, version FROM lessons WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("explain_refusal", e))?;

        let Some(row) = row else {
            return Ok(UpdateOutcome::NotFound);
        };

        let spaces: i64 = row
            .try_get("spaces")
            .map_err(|e| map_sqlx_error("explain_refusal", e))?;
        let version = decode_version(&row)?;

        if !update.expected.matches(version) {
            return Ok(UpdateOutcome::VersionMismatch { actual: version });
        }
        match spaces.checked_add(update.delta) {
            None => Ok(UpdateOutcome::Rejected(SpacesRejection::Overflow)),
            Some(next) if next < 0 => Ok(UpdateOutcome::Rejected(SpacesRejection::Insufficient {
                available: spaces,
                requested: update.delta.saturating_neg(),
            })),
            // The row changed between the UPDATE and this read, even under
            // `Any`; the caller reissues the write.
            Some(_) => Ok(UpdateOutcome::VersionMismatch { actual: version }),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self, filter), err)]
    async fn find(&self, filter: &LessonFilter) -> Result<Vec<Lesson>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {LESSON_COLUMNS} FROM lessons"));
        push_where(&mut qb, filter);
        qb.push(" ORDER BY id ASC");

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        rows.iter().map(decode_lesson).collect()
    }

    #[instrument(skip(self), fields(lesson_id = %id), err)]
    async fn get(&self, id: LessonId) -> Result<Option<Lesson>, StoreError> {
        let row = sqlx::query(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(decode_lesson).transpose()
    }

    #[instrument(skip(self), fields(lesson_id = %id, delta = update.delta), err)]
    async fn conditional_update(
        &self,
        id: LessonId,
        update: SpacesUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let expected: Option<i64> = match update.expected {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(v as i64),
        };

        let result = sqlx::query(&format!(
            r#"
            UPDATE lessons
            SET spaces = spaces + $2,
                version = version + 1
            WHERE id = $1
              AND ($3::bigint IS NULL OR version = $3)
              AND spaces + $2 >= 0
            RETURNING {LESSON_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(update.delta)
        .bind(expected)
        .fetch_optional(&*self.pool)
        .await;

        match result {
            Ok(Some(row)) => Ok(UpdateOutcome::Applied(decode_lesson(&row)?)),
            Ok(None) => self.explain_refusal(id, update).await,
            Err(e) if is_numeric_overflow(&e) => {
                Ok(UpdateOutcome::Rejected(SpacesRejection::Overflow))
            }
            Err(e) => Err(map_sqlx_error("conditional_update", e)),
        }
    }

    #[instrument(skip(self, lesson), err)]
    async fn insert(&self, lesson: NewLesson) -> Result<LessonId, StoreError> {
        lesson
            .validate()
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        let id = LessonId::new();
        sqlx::query(
            r#"
            INSERT INTO lessons (id, subject, location, description, price, spaces, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&lesson.subject)
        .bind(&lesson.location)
        .bind(&lesson.description)
        .bind(lesson.price)
        .bind(lesson.spaces)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_lesson", e))?;

        Ok(id)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM lessons")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;
        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count", e))?;
        Ok(total.max(0) as u64)
    }
}

/// Postgres-backed append-only order store.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, order), fields(items = order.items.len()), err)]
    async fn insert(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        let id = OrderId::new();
        sqlx::query(
            r#"
            INSERT INTO orders (id, items, name, phone, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(sqlx::types::Json(&order.items))
        .bind(&order.name)
        .bind(&order.phone)
        .bind(order.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        Ok(id)
    }
}

/// Render a lesson filter as a `WHERE` clause with bound parameters.
///
/// Column names come from the closed field enums, never from input.
fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &LessonFilter) {
    let predicates = match filter {
        LessonFilter::All => return,
        LessonFilter::AnyOf(predicates) => predicates,
    };

    if predicates.is_empty() {
        qb.push(" WHERE FALSE");
        return;
    }

    qb.push(" WHERE ");
    for (idx, predicate) in predicates.iter().enumerate() {
        if idx > 0 {
            qb.push(" OR ");
        }
        match predicate {
            FieldPredicate::Equals { field, value } => {
                qb.push(field.as_str());
                qb.push("::double precision = ");
                qb.push_bind(*value);
            }
            FieldPredicate::ContainsIgnoreCase { field, needle } => {
                // strpos keeps the needle literal (no LIKE wildcards to escape).
                qb.push("strpos(lower(");
                qb.push(field.as_str());
                qb.push("), ");
                qb.push_bind(needle.clone());
                qb.push(") > 0");
            }
        }
    }
}

fn decode_lesson(row: &PgRow) -> Result<Lesson, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode_lesson", e);

    let id: Uuid = row.try_get("id").map_err(decode)?;
    Ok(Lesson {
        id: LessonId::from_uuid(id),
        subject: row.try_get("subject").map_err(decode)?,
        location: row.try_get("location").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        price: row.try_get("price").map_err(decode)?,
        spaces: row.try_get("spaces").map_err(decode)?,
        version: decode_version(row)?,
    })
}

fn decode_version(row: &PgRow) -> Result<u64, StoreError> {
    let version: i64 = row
        .try_get("version")
        .map_err(|e| map_sqlx_error("decode_version", e))?;
    u64::try_from(version)
        .map_err(|_| StoreError::InvalidRecord(format!("negative version {version}")))
}

fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("22003"),
        _ => false,
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23514") => StoreError::InvalidRecord(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
            StoreError::InvalidRecord(format!("{operation}: {err}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
