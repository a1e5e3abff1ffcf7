//! Drill repository
//!
//! Reads aggregate link ids with `ARRAY(...)` subqueries and load
//! instructions in one extra query per call (no N+1).
//!
//! Writes go through [`DrillWriter`], which replaces the drill's links and
//! instructions wholesale. Instruction rows whose number is absent from
//! the written drill are deleted.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::models::{Drill, Instruction};
use crate::db::DbError;

const SELECT_DRILLS: &str = r#"
    SELECT
        d.id,
        d.name,
        d.update_timestamp,
        ARRAY(
            SELECT dc.category_id FROM drill_categories dc
            WHERE dc.drill_id = d.id ORDER BY dc.category_id
        ) AS categories,
        ARRAY(
            SELECT ds.sub_category_id FROM drill_sub_categories ds
            WHERE ds.drill_id = d.id ORDER BY ds.sub_category_id
        ) AS sub_categories,
        ARRAY(
            SELECT dr.related_drill_id FROM drill_related_drills dr
            WHERE dr.drill_id = d.id ORDER BY dr.position
        ) AS related_drills
    FROM drills d
"#;

/// Drill row with aggregated link ids
#[derive(Debug, FromRow)]
struct DrillRow {
    id: i64,
    name: String,
    update_timestamp: i64,
    categories: Vec<i64>,
    sub_categories: Vec<i64>,
    related_drills: Vec<i64>,
}

/// Instruction record from database
#[derive(Debug, FromRow)]
struct InstructionRow {
    drill_id: i64,
    number: i32,
    description: String,
    steps: Vec<String>,
    video_id: Option<String>,
}

impl From<InstructionRow> for Instruction {
    fn from(r: InstructionRow) -> Self {
        Self {
            drill_id: Some(r.drill_id),
            number: r.number,
            description: r.description,
            steps: r.steps,
            video_id: r.video_id,
        }
    }
}

/// Attach instructions to their drills, preserving row order.
fn assemble(rows: Vec<DrillRow>, instructions: Vec<InstructionRow>) -> Vec<Drill> {
    let mut by_drill: HashMap<i64, Vec<Instruction>> = HashMap::new();
    for row in instructions {
        by_drill.entry(row.drill_id).or_default().push(row.into());
    }

    rows.into_iter()
        .map(|r| Drill {
            id: Some(r.id),
            update_timestamp: r.update_timestamp,
            name: r.name,
            categories: r.categories.into_iter().collect(),
            sub_categories: r.sub_categories.into_iter().collect(),
            related_drills: r.related_drills,
            instructions: by_drill.remove(&r.id).unwrap_or_default(),
        })
        .collect()
}

/// One persistence write of a drill and everything it owns.
#[async_trait]
pub trait DrillWriter: Send {
    /// Insert (`id: None`) or update the drill, replace its links and
    /// instructions, and return the drill id.
    async fn write(&mut self, drill: &Drill) -> Result<i64, DbError>;
}

/// [`DrillWriter`] bound to an open connection, usually a transaction.
pub struct PgDrillWriter<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgDrillWriter<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    async fn upsert_row(&mut self, drill: &Drill) -> Result<i64, DbError> {
        match drill.id {
            None => Ok(sqlx::query_scalar(
                "INSERT INTO drills (name, update_timestamp) VALUES ($1, $2) RETURNING id",
            )
            .bind(&drill.name)
            .bind(drill.update_timestamp)
            .fetch_one(&mut *self.conn)
            .await?),
            Some(id) => sqlx::query_scalar(
                "UPDATE drills SET name = $2, update_timestamp = $3 WHERE id = $1 RETURNING id",
            )
            .bind(id)
            .bind(&drill.name)
            .bind(drill.update_timestamp)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| DbError::not_found("drill", id)),
        }
    }

    async fn replace_links(&mut self, id: i64, drill: &Drill) -> Result<(), DbError> {
        let categories: Vec<i64> = drill.categories.iter().copied().collect();
        let sub_categories: Vec<i64> = drill.sub_categories.iter().copied().collect();

        sqlx::query("DELETE FROM drill_categories WHERE drill_id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        if !categories.is_empty() {
            sqlx::query(
                "INSERT INTO drill_categories (drill_id, category_id) \
                 SELECT $1, UNNEST($2::bigint[])",
            )
            .bind(id)
            .bind(&categories)
            .execute(&mut *self.conn)
            .await?;
        }

        sqlx::query("DELETE FROM drill_sub_categories WHERE drill_id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        if !sub_categories.is_empty() {
            sqlx::query(
                "INSERT INTO drill_sub_categories (drill_id, sub_category_id) \
                 SELECT $1, UNNEST($2::bigint[])",
            )
            .bind(id)
            .bind(&sub_categories)
            .execute(&mut *self.conn)
            .await?;
        }

        sqlx::query("DELETE FROM drill_related_drills WHERE drill_id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        if !drill.related_drills.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO drill_related_drills (drill_id, related_drill_id, position)
                SELECT $1, r.related, r.position::int
                FROM UNNEST($2::bigint[]) WITH ORDINALITY AS r(related, position)
                "#,
            )
            .bind(id)
            .bind(&drill.related_drills)
            .execute(&mut *self.conn)
            .await?;
        }

        Ok(())
    }

    async fn replace_instructions(&mut self, id: i64, drill: &Drill) -> Result<(), DbError> {
        let numbers: Vec<i32> = drill.instructions.iter().map(|i| i.number).collect();

        // Orphan removal
        let removed = sqlx::query(
            "DELETE FROM instructions WHERE drill_id = $1 AND NOT (number = ANY($2))",
        )
        .bind(id)
        .bind(&numbers)
        .execute(&mut *self.conn)
        .await?
        .rows_affected();

        for ins in &drill.instructions {
            sqlx::query(
                r#"
                INSERT INTO instructions (drill_id, number, description, steps, video_id)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (drill_id, number) DO UPDATE
                SET description = EXCLUDED.description,
                    steps = EXCLUDED.steps,
                    video_id = EXCLUDED.video_id
                "#,
            )
            .bind(ins.drill_id)
            .bind(ins.number)
            .bind(&ins.description)
            .bind(&ins.steps)
            .bind(ins.video_id.as_deref())
            .execute(&mut *self.conn)
            .await?;
        }

        tracing::debug!(
            drill_id = id,
            written = drill.instructions.len(),
            removed,
            "instructions replaced"
        );
        Ok(())
    }
}

#[async_trait]
impl DrillWriter for PgDrillWriter<'_> {
    async fn write(&mut self, drill: &Drill) -> Result<i64, DbError> {
        let id = self.upsert_row(drill).await?;
        self.replace_links(id, drill).await?;
        self.replace_instructions(id, drill).await?;
        Ok(id)
    }
}

/// Drill repository
pub struct DrillRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DrillRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, rows: Vec<DrillRow>) -> Result<Vec<Drill>, DbError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let instructions: Vec<InstructionRow> = sqlx::query_as(
            r#"
            SELECT drill_id, number, description, steps, video_id
            FROM instructions
            WHERE drill_id = ANY($1)
            ORDER BY drill_id, number
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(assemble(rows, instructions))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Drill>, DbError> {
        let sql = format!("{} WHERE d.id = $1", SELECT_DRILLS);
        let rows: Vec<DrillRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await?;
        Ok(self.load(rows).await?.pop())
    }

    /// Case-insensitive name lookup.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Drill>, DbError> {
        let sql = format!("{} WHERE LOWER(d.name) = LOWER($1)", SELECT_DRILLS);
        let rows: Vec<DrillRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_all(self.pool)
            .await?;
        Ok(self.load(rows).await?.pop())
    }

    pub async fn find_all(&self) -> Result<Vec<Drill>, DbError> {
        let sql = format!("{} ORDER BY d.id", SELECT_DRILLS);
        let rows: Vec<DrillRow> = sqlx::query_as(&sql).fetch_all(self.pool).await?;
        self.load(rows).await
    }

    /// Delete a drill. Instructions and link rows cascade; tags are untouched.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM drills WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
