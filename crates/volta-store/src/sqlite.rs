//! # SQLite Store
//!
//! A durable [`DocumentStore`] over a single `documents` table.
//!
//! ## How Writes Map to SQL
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ Create       │ INSERT … ON CONFLICT DO NOTHING, 0 rows → AlreadyExists  │
//! │ Set          │ INSERT … ON CONFLICT DO UPDATE SET body = excluded.body  │
//! │ Merge        │ read body in the transaction, merge, upsert              │
//! │ Delete       │ DELETE, event only when a row went away                  │
//! │ Decrement    │ UPDATE … json_set(body, path, MAX(0, current − by))      │
//! │ Expect       │ read body in the transaction, compare, roll back on miss │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```
//! Every commit is one transaction. Change events are published after the
//! transaction commits.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use crate::document::{
    check_expected, json_path, merge_shallow, ChangeEvent, Direction, Document, Query, Write,
};
use crate::error::{StoreError, StoreResult};
use crate::hub::{ChangeHub, Subscription};
use crate::migrations;
use crate::pool::{self, DbConfig};
use crate::store::DocumentStore;

/// SQLite-backed document store.
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    hub: ChangeHub,
}

impl SqliteStore {
    /// Opens the database and applies pending migrations when enabled.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let store = SqliteStore::open(DbConfig::new("./volta.db")).await?;
    /// ```
    pub async fn open(config: DbConfig) -> StoreResult<Self> {
        let pool = pool::connect(&config).await?;
        let store = SqliteStore {
            pool,
            hub: ChangeHub::default(),
        };
        if config.run_migrations {
            migrations::run_migrations(&store.pool).await?;
        }
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migration_status(&self) -> StoreResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

fn row_to_document(row: &SqliteRow) -> StoreResult<Document> {
    let id: String = row.try_get("id")?;
    let body: String = row.try_get("body")?;
    Ok(Document::new(id, serde_json::from_str(&body)?))
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, path: &str, value: &Value) {
    builder
        .push(" AND json_extract(body, ")
        .push_bind(json_path(path))
        .push(")");
    match value {
        Value::Null => {
            builder.push(" IS NULL");
        }
        Value::Bool(flag) => {
            builder.push(" = ").push_bind(i64::from(*flag));
        }
        Value::Number(number) => match number.as_i64() {
            Some(int) => {
                builder.push(" = ").push_bind(int);
            }
            None => {
                builder
                    .push(" = ")
                    .push_bind(number.as_f64().unwrap_or_default());
            }
        },
        Value::String(text) => {
            builder.push(" = ").push_bind(text.clone());
        }
        other => {
            builder.push(" = json(").push_bind(other.to_string()).push(")");
        }
    }
}

async fn fetch_body(
    conn: &mut SqliteConnection,
    collection: &str,
    id: &str,
) -> StoreResult<Option<Value>> {
    let body: Option<String> =
        sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
}

async fn upsert(
    conn: &mut SqliteConnection,
    collection: &str,
    id: &str,
    data: &Value,
    now: i64,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO documents (collection, id, body, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT (collection, id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
    )
    .bind(collection)
    .bind(id)
    .bind(data.to_string())
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let mut conn = self.pool.acquire().await?;
        fetch_body(&mut conn, collection, id).await
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query("SELECT id, body FROM documents WHERE collection = ? ORDER BY id")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_document).collect()
    }

    #[instrument(skip(self), fields(collection = %query.collection))]
    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, body FROM documents WHERE collection = ");
        builder.push_bind(query.collection.clone());

        for (path, value) in &query.filters {
            push_filter(&mut builder, path, value);
        }

        if let Some((path, direction)) = &query.order_by {
            builder
                .push(" ORDER BY json_extract(body, ")
                .push_bind(json_path(path))
                .push(match direction {
                    Direction::Ascending => ") ASC",
                    Direction::Descending => ") DESC",
                })
                .push(", id");
        } else {
            builder.push(" ORDER BY id");
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), "Query complete");
        rows.iter().map(row_to_document).collect()
    }

    #[instrument(skip(self, writes), fields(writes = writes.len()))]
    async fn commit(&self, writes: Vec<Write>) -> StoreResult<()> {
        let now = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        let mut events: Vec<(String, ChangeEvent)> = Vec::with_capacity(writes.len());

        for write in writes {
            match write {
                Write::Create {
                    collection,
                    id,
                    data,
                } => {
                    let result = sqlx::query(
                        "INSERT INTO documents (collection, id, body, updated_at) VALUES (?, ?, ?, ?)
                         ON CONFLICT (collection, id) DO NOTHING",
                    )
                    .bind(&collection)
                    .bind(&id)
                    .bind(data.to_string())
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        // Dropping the transaction rolls back earlier writes.
                        return Err(StoreError::already_exists(collection, id));
                    }
                    events.push((collection, ChangeEvent::Upserted { id, data }));
                }
                Write::Set {
                    collection,
                    id,
                    data,
                } => {
                    upsert(&mut tx, &collection, &id, &data, now).await?;
                    events.push((collection, ChangeEvent::Upserted { id, data }));
                }
                Write::Merge {
                    collection,
                    id,
                    data,
                } => {
                    let mut doc = fetch_body(&mut tx, &collection, &id)
                        .await?
                        .unwrap_or(Value::Null);
                    merge_shallow(&mut doc, data);
                    upsert(&mut tx, &collection, &id, &doc, now).await?;
                    events.push((collection, ChangeEvent::Upserted { id, data: doc }));
                }
                Write::Delete { collection, id } => {
                    let result =
                        sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
                            .bind(&collection)
                            .bind(&id)
                            .execute(&mut *tx)
                            .await?;
                    if result.rows_affected() > 0 {
                        events.push((collection, ChangeEvent::Removed { id }));
                    }
                }
                Write::Decrement {
                    collection,
                    id,
                    field,
                    by,
                } => {
                    let path = json_path(&field);
                    let body: Option<String> = sqlx::query_scalar(
                        "UPDATE documents
                         SET body = json_set(body, ?, MAX(0, COALESCE(json_extract(body, ?), 0) - ?)),
                             updated_at = ?
                         WHERE collection = ? AND id = ?
                         RETURNING body",
                    )
                    .bind(&path)
                    .bind(&path)
                    .bind(by)
                    .bind(now)
                    .bind(&collection)
                    .bind(&id)
                    .fetch_optional(&mut *tx)
                    .await?;
                    if let Some(body) = body {
                        let data = serde_json::from_str(&body)?;
                        events.push((collection, ChangeEvent::Upserted { id, data }));
                    }
                }
                Write::Expect {
                    collection,
                    id,
                    field,
                    value,
                } => {
                    let doc = fetch_body(&mut tx, &collection, &id).await?;
                    check_expected(doc.as_ref(), &collection, &id, &field, &value)?;
                }
            }
        }

        tx.commit().await?;

        for (collection, event) in events {
            self.hub.publish(&collection, event);
        }
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> Subscription {
        self.hub.subscribe(collection)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
