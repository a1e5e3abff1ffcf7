//! Schema bootstrap and constraint verification
//!
//! Constraint names are spelled out so violations can be mapped through
//! [`Constraint`]. Names are unique indexes on `LOWER(name)` for
//! case-insensitive uniqueness.

use std::collections::HashSet;

use sqlx::PgPool;

use super::{Constraint, DbError};

/// Tables owned by this schema
pub const TABLES: [&str; 7] = [
    "drills",
    "categories",
    "sub_categories",
    "instructions",
    "drill_categories",
    "drill_sub_categories",
    "drill_related_drills",
];

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS drills (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY,
        name VARCHAR(255) NOT NULL,
        update_timestamp BIGINT NOT NULL DEFAULT 0,
        CONSTRAINT pk_drills PRIMARY KEY (id)
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS uk_drills_name ON drills (LOWER(name))",
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY,
        name VARCHAR(255) NOT NULL,
        description VARCHAR(511) NOT NULL,
        CONSTRAINT pk_categories PRIMARY KEY (id)
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS uk_categories_name ON categories (LOWER(name))",
    r#"
    CREATE TABLE IF NOT EXISTS sub_categories (
        id BIGINT GENERATED BY DEFAULT AS IDENTITY,
        name VARCHAR(255) NOT NULL,
        description VARCHAR(511) NOT NULL,
        CONSTRAINT pk_sub_categories PRIMARY KEY (id)
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS uk_sub_categories_name ON sub_categories (LOWER(name))",
    r#"
    CREATE TABLE IF NOT EXISTS instructions (
        drill_id BIGINT NOT NULL,
        number INTEGER NOT NULL,
        description VARCHAR(511) NOT NULL,
        steps TEXT[] NOT NULL DEFAULT '{}',
        video_id VARCHAR(127),
        CONSTRAINT pk_instructions PRIMARY KEY (drill_id, number),
        CONSTRAINT fk_instructions_drill FOREIGN KEY (drill_id)
            REFERENCES drills (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS drill_categories (
        drill_id BIGINT NOT NULL,
        category_id BIGINT NOT NULL,
        CONSTRAINT pk_drill_categories PRIMARY KEY (drill_id, category_id),
        CONSTRAINT fk_drill_categories_drill FOREIGN KEY (drill_id)
            REFERENCES drills (id) ON DELETE CASCADE,
        CONSTRAINT fk_drill_categories_category FOREIGN KEY (category_id)
            REFERENCES categories (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS drill_sub_categories (
        drill_id BIGINT NOT NULL,
        sub_category_id BIGINT NOT NULL,
        CONSTRAINT pk_drill_sub_categories PRIMARY KEY (drill_id, sub_category_id),
        CONSTRAINT fk_drill_sub_categories_drill FOREIGN KEY (drill_id)
            REFERENCES drills (id) ON DELETE CASCADE,
        CONSTRAINT fk_drill_sub_categories_sub_category FOREIGN KEY (sub_category_id)
            REFERENCES sub_categories (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS drill_related_drills (
        drill_id BIGINT NOT NULL,
        related_drill_id BIGINT NOT NULL,
        position INTEGER NOT NULL,
        CONSTRAINT pk_drill_related_drills PRIMARY KEY (drill_id, related_drill_id),
        CONSTRAINT fk_drill_related_drills_drill FOREIGN KEY (drill_id)
            REFERENCES drills (id) ON DELETE CASCADE,
        CONSTRAINT fk_drill_related_drills_related FOREIGN KEY (related_drill_id)
            REFERENCES drills (id) ON DELETE CASCADE
    )
    "#,
];

/// Create all tables and indexes (idempotent, one transaction).
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running schema bootstrap...");

    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(tables = TABLES.len(), "Schema ready");
    Ok(())
}

/// Outcome of comparing live constraint names with [`Constraint::ALL`]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConstraintReport {
    /// Mapped names absent from the schema
    pub missing: Vec<&'static str>,
    /// Schema names with no mapping (violations fall back to the generic message)
    pub unmapped: Vec<String>,
}

/// Compare constraint names found in the schema with the mapped ones.
pub fn compare_constraints(present: &HashSet<String>) -> ConstraintReport {
    let missing = Constraint::ALL
        .iter()
        .map(|c| c.name())
        .filter(|name| !present.contains(*name))
        .collect();

    let mut unmapped: Vec<String> = present
        .iter()
        .filter(|name| Constraint::from_name(name).is_none())
        .cloned()
        .collect();
    unmapped.sort();

    ConstraintReport { missing, unmapped }
}

/// Check that every mapped constraint exists in the live schema.
///
/// Missing names are a hard failure; unmapped ones are logged.
pub async fn verify_constraints(pool: &PgPool) -> Result<(), DbError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT c.conname::text
        FROM pg_constraint c
        JOIN pg_class t ON t.oid = c.conrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        WHERE n.nspname = current_schema()
          AND t.relname::text = ANY($1)
          AND c.contype IN ('p', 'u', 'f')
        UNION
        SELECT i.indexname::text
        FROM pg_indexes i
        WHERE i.schemaname = current_schema()
          AND i.tablename::text = ANY($1)
          AND i.indexdef LIKE 'CREATE UNIQUE INDEX%'
        "#,
    )
    .bind(&TABLES[..])
    .fetch_all(pool)
    .await?;

    let present: HashSet<String> = rows.into_iter().map(|(name,)| name).collect();
    let report = compare_constraints(&present);

    for name in &report.unmapped {
        tracing::warn!(constraint = %name, "constraint has no user message");
    }

    if !report.missing.is_empty() {
        return Err(DbError::MissingConstraints(report.missing));
    }

    tracing::debug!(count = present.len(), "constraint mapping verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_constraint_is_declared() {
        let ddl = STATEMENTS.concat();
        for c in Constraint::ALL {
            assert!(ddl.contains(c.name()), "{} not in schema", c.name());
        }
    }

    #[test]
    fn every_table_is_created() {
        let ddl = STATEMENTS.concat();
        for table in TABLES {
            assert!(ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)));
        }
    }

    #[test]
    fn report_lists_missing_and_unmapped() {
        let mut present: HashSet<String> = Constraint::ALL
            .iter()
            .map(|c| c.name().to_owned())
            .collect();
        present.remove("uk_drills_name");
        present.insert("drills_name_key".to_owned());

        let report = compare_constraints(&present);
        assert_eq!(report.missing, ["uk_drills_name"]);
        assert_eq!(report.unmapped, ["drills_name_key"]);
    }

    #[test]
    fn complete_schema_reports_nothing() {
        let present = Constraint::ALL
            .iter()
            .map(|c| c.name().to_owned())
            .collect();
        assert_eq!(compare_constraints(&present), ConstraintReport::default());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn bootstrap_is_idempotent_and_complete() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");

        run(&pool).await.expect("first run");
        run(&pool).await.expect("second run");
        verify_constraints(&pool).await.expect("constraints present");
    }
}
