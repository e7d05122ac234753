//! Landmark repository on PostGIS.
//!
//! Points are stored as `geography(Point, 4326)`, so `ST_DWithin` and the
//! `<->` ordering work in metres on the spheroid. The author's username is
//! joined from `remark_user` on every read.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use remark_core::{
    Coordinates, Error, LandmarkBackend, LandmarkQuery, LandmarkRecord, NewLandmark, Result,
};

const SELECT_COLUMNS: &str = r#"
    l.id,
    l.note,
    ST_Y(l.location::geometry) AS latitude,
    ST_X(l.location::geometry) AS longitude,
    u.username AS author
"#;

/// PostgreSQL landmark repository.
#[derive(Clone)]
pub struct PgLandmarkRepository {
    pool: Pool<Postgres>,
}

impl PgLandmarkRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &PgRow) -> Result<LandmarkRecord> {
    let id: Uuid = row.try_get("id")?;
    Ok(LandmarkRecord {
        id: id.to_string(),
        coordinates: Coordinates {
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
        },
        note: row.try_get("note")?,
        author: row.try_get("author")?,
    })
}

/// Parse a landmark id. Ids that are not UUIDs cannot exist in the table.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

#[async_trait]
impl LandmarkBackend for PgLandmarkRepository {
    async fn query(&self, query: &LandmarkQuery) -> Result<Vec<LandmarkRecord>> {
        let start = Instant::now();
        let rows = match query.near {
            Some(near) => {
                let sql = format!(
                    r#"
                    SELECT {SELECT_COLUMNS}
                    FROM landmark l
                    JOIN remark_user u ON u.id = l.user_id
                    WHERE $3::float8 IS NULL
                       OR ST_DWithin(
                              l.location,
                              ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography,
                              $3
                          )
                    ORDER BY l.location <-> ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography,
                             l.id
                    LIMIT $4
                    "#
                );
                sqlx::query(&sql)
                    .bind(near.origin.latitude)
                    .bind(near.origin.longitude)
                    .bind(near.within_km.map(|km| km * 1000.0))
                    .bind(query.limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    r#"
                    SELECT {SELECT_COLUMNS}
                    FROM landmark l
                    JOIN remark_user u ON u.id = l.user_id
                    ORDER BY l.note COLLATE "C", l.id
                    LIMIT $1
                    "#
                );
                sqlx::query(&sql)
                    .bind(query.limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let records = rows.iter().map(row_to_record).collect::<Result<Vec<_>>>()?;
        debug!(
            subsystem = "db",
            component = "landmarks",
            op = "query",
            geo = query.near.is_some(),
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Landmark query complete"
        );
        Ok(records)
    }

    async fn create(&self, landmark: NewLandmark) -> Result<LandmarkRecord> {
        let id = Uuid::now_v7();
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO landmark (id, note, location, user_id)
                SELECT $1, $2, ST_SetSRID(ST_MakePoint($4, $3), 4326)::geography, u.id
                FROM remark_user u
                WHERE u.username = $5
                RETURNING id, note, location
            )
            SELECT i.id,
                   i.note,
                   ST_Y(i.location::geometry) AS latitude,
                   ST_X(i.location::geometry) AS longitude,
                   $5 AS author
            FROM inserted i
            "#,
        )
        .bind(id)
        .bind(&landmark.note)
        .bind(landmark.coordinates.latitude)
        .bind(landmark.coordinates.longitude)
        .bind(&landmark.author)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized(format!("unknown user '{}'", landmark.author)))?;

        let record = row_to_record(&row)?;
        info!(
            subsystem = "db",
            component = "landmarks",
            op = "create",
            landmark_id = %record.id,
            username = %record.author,
            "Landmark stored"
        );
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Vec<LandmarkRecord>> {
        let Some(uuid) = parse_id(id) else {
            debug!(
                subsystem = "db",
                component = "landmarks",
                op = "find_by_id",
                landmark_id = %id,
                "Id is not a UUID"
            );
            return Ok(Vec::new());
        };
        let sql = format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM landmark l
            JOIN remark_user u ON u.id = l.user_id
            WHERE l.id = $1
            "#
        );
        let rows = sqlx::query(&sql).bind(uuid).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn save(&self, record: &LandmarkRecord) -> Result<LandmarkRecord> {
        let uuid = parse_id(&record.id).ok_or_else(|| Error::RecordNotFound(record.id.clone()))?;
        let row = sqlx::query(
            r#"
            UPDATE landmark l
            SET note = $2, updated_at = now()
            FROM remark_user u
            WHERE l.id = $1 AND u.id = l.user_id
            RETURNING l.id,
                      l.note,
                      ST_Y(l.location::geometry) AS latitude,
                      ST_X(l.location::geometry) AS longitude,
                      u.username AS author
            "#,
        )
        .bind(uuid)
        .bind(&record.note)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::RecordNotFound(record.id.clone()))?;

        info!(
            subsystem = "db",
            component = "landmarks",
            op = "save",
            landmark_id = %record.id,
            "Landmark note saved"
        );
        row_to_record(&row)
    }

    async fn delete(&self, record: &LandmarkRecord) -> Result<()> {
        let uuid = parse_id(&record.id).ok_or_else(|| Error::RecordNotFound(record.id.clone()))?;
        let result = sqlx::query("DELETE FROM landmark WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(record.id.clone()));
        }
        info!(
            subsystem = "db",
            component = "landmarks",
            op = "delete",
            landmark_id = %record.id,
            "Landmark deleted"
        );
        Ok(())
    }
}
