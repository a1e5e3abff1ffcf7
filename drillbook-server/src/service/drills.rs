//! Drill service - two-phase save
//!
//! Instructions reference their drill by id, and a new drill has no id
//! until its row is inserted. Saving a drill with instructions therefore
//! takes two writes in one transaction:
//! 1. write the drill with its instructions detached, obtaining the id
//! 2. stamp the id on every instruction, reattach, write again
//!
//! A drill without instructions takes a single write.

use sqlx::PgPool;

use crate::db::{DbError, DrillRepo, DrillWriter, PgDrillWriter};
use crate::models::Drill;
use super::ServiceError;

/// Run the save sequence against `writer`, stamping `timestamp`.
///
/// Returns the drill as written, with its id and every instruction's
/// `drill_id` set. Transaction handling is the caller's job.
pub async fn save_with<W>(writer: &mut W, mut drill: Drill, timestamp: i64) -> Result<Drill, DbError>
where
    W: DrillWriter + ?Sized,
{
    drill.update_timestamp = timestamp;

    if drill.instructions.is_empty() {
        drill.id = Some(writer.write(&drill).await?);
        return Ok(drill);
    }

    let mut instructions = std::mem::take(&mut drill.instructions);
    let id = writer.write(&drill).await?;
    drill.id = Some(id);

    for ins in &mut instructions {
        ins.drill_id = Some(id);
    }
    drill.instructions = instructions;
    writer.write(&drill).await?;

    Ok(drill)
}

/// Drill service
pub struct DrillService<'a> {
    pool: &'a PgPool,
}

impl<'a> DrillService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> DrillRepo<'a> {
        DrillRepo::new(self.pool)
    }

    /// Save atomically: both writes commit together or not at all.
    pub async fn save(&self, drill: Drill) -> Result<Drill, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let timestamp = chrono::Utc::now().timestamp_millis();
        // Dropping `tx` on error rolls back
        let saved = save_with(&mut PgDrillWriter::new(&mut *tx), drill, timestamp)
            .await
            .map_err(ServiceError::from_write)?;

        tx.commit()
            .await
            .map_err(|e| ServiceError::from_write(e.into()))?;

        tracing::info!(
            drill_id = saved.id,
            instructions = saved.instructions.len(),
            "drill saved"
        );
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Drill>, DbError> {
        self.repo().find_by_id(id).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Drill>, DbError> {
        self.repo().find_by_name(name).await
    }

    pub async fn find_all(&self) -> Result<Vec<Drill>, DbError> {
        self.repo().find_all().await
    }

    /// Idempotent delete.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), DbError> {
        let existed = self.repo().delete_by_id(id).await?;
        tracing::debug!(drill_id = id, existed, "drill deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::models::{EntityName, Instruction};

    /// Records every write and hands out ids like a sequence
    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<Drill>,
        next_id: i64,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl DrillWriter for RecordingWriter {
        async fn write(&mut self, drill: &Drill) -> Result<i64, DbError> {
            if self.fail_on == Some(self.writes.len()) {
                return Err(DbError::not_found("drill", "forced"));
            }
            self.writes.push(drill.clone());
            Ok(match drill.id {
                Some(id) => id,
                None => {
                    self.next_id += 1;
                    self.next_id
                }
            })
        }
    }

    fn drill(name: &str, instructions: usize) -> Drill {
        let mut d = Drill::new(EntityName::new(name).unwrap());
        d.instructions = (1..=instructions as i32)
            .map(|n| Instruction::parse(n, &format!("step {}", n), &["move"], None).unwrap())
            .collect();
        d
    }

    #[tokio::test]
    async fn no_instructions_is_one_write() {
        let mut writer = RecordingWriter::default();
        let saved = save_with(&mut writer, drill("Hammer fist", 0), 100)
            .await
            .unwrap();

        assert_eq!(writer.writes.len(), 1);
        assert_eq!(saved.id, Some(1));
        assert_eq!(saved.update_timestamp, 100);
    }

    #[tokio::test]
    async fn instructions_take_two_writes_and_get_the_new_id() {
        let mut writer = RecordingWriter {
            next_id: 41,
            ..Default::default()
        };
        let saved = save_with(&mut writer, drill("Bear hug escape", 3), 100)
            .await
            .unwrap();

        assert_eq!(writer.writes.len(), 2);
        // First write carries no instructions
        assert!(writer.writes[0].instructions.is_empty());
        assert_eq!(writer.writes[0].id, None);
        // Second write targets the new id with every instruction stamped
        assert_eq!(writer.writes[1].id, Some(42));
        assert_eq!(writer.writes[1].instructions.len(), 3);

        assert_eq!(saved.id, Some(42));
        assert!(saved.instructions.iter().all(|i| i.drill_id == Some(42)));
    }

    #[tokio::test]
    async fn existing_drill_ids_overwrite_stale_instruction_ids() {
        let mut d = drill("Choke defense", 2);
        d.id = Some(7);
        d.instructions[0].drill_id = Some(99);

        let mut writer = RecordingWriter::default();
        let saved = save_with(&mut writer, d, 5).await.unwrap();

        assert_eq!(writer.writes.len(), 2);
        assert!(saved.instructions.iter().all(|i| i.drill_id == Some(7)));
    }

    #[tokio::test]
    async fn failure_in_second_write_propagates() {
        let mut writer = RecordingWriter {
            fail_on: Some(1),
            ..Default::default()
        };
        let err = save_with(&mut writer, drill("Headlock", 1), 1)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(writer.writes.len(), 1);
    }

    // Integration tests - run with DATABASE_URL set
    // cargo test -p drillbook-server -- --ignored

    mod with_database {
        use super::*;
        use crate::db::{create_pool, schema};
        use crate::models::{CategoryKind, TagDraft};
        use crate::service::TagService;

        async fn pool() -> PgPool {
            let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
            let pool = create_pool(&url).await.expect("pool creation failed");
            schema::run(&pool).await.expect("schema");
            pool
        }

        fn unique(prefix: &str) -> String {
            format!("{}-{}", prefix, chrono::Utc::now().timestamp_micros())
        }

        #[tokio::test]
        #[ignore = "requires database"]
        async fn delete_cascades_instructions_but_keeps_categories() {
            let pool = pool().await;
            let categories = TagService::<CategoryKind>::new(&pool);
            let drills = DrillService::new(&pool);

            let kicks = categories
                .save(TagDraft::parse(None, &unique("Kicks"), "Leg strikes").unwrap())
                .await
                .unwrap();

            let mut d = drill(&unique("Front kick"), 2);
            d.categories.insert(kicks.id);
            let saved = drills.save(d).await.unwrap();
            let id = saved.id.unwrap();

            let loaded = drills.find_by_id(id).await.unwrap().unwrap();
            assert_eq!(loaded.instructions.len(), 2);
            assert!(loaded.categories.contains(&kicks.id));

            drills.delete_by_id(id).await.unwrap();
            assert!(drills.find_by_id(id).await.unwrap().is_none());
            let (left,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM instructions WHERE drill_id = $1")
                    .bind(id)
                    .fetch_one(&pool)
                    .await
                    .unwrap();
            assert_eq!(left, 0);
            assert!(categories.find_by_id(kicks.id).await.unwrap().is_some());

            categories.delete_by_id(kicks.id).await.unwrap();
        }

        #[tokio::test]
        #[ignore = "requires database"]
        async fn unknown_category_rolls_back_everything() {
            let pool = pool().await;
            let drills = DrillService::new(&pool);
            let name = unique("Elbow strike");

            let mut d = drill(&name, 1);
            d.categories.insert(i64::MAX);
            let err = drills.save(d).await.unwrap_err();

            match err {
                ServiceError::Insert(e) => assert_eq!(e.message(), "Category does not exist."),
                other => panic!("unexpected error: {other}"),
            }
            assert!(drills.find_by_name(&name).await.unwrap().is_none());
        }

        #[tokio::test]
        #[ignore = "requires database"]
        async fn drill_names_are_unique_ignoring_case() {
            let pool = pool().await;
            let drills = DrillService::new(&pool);
            let name = unique("Palm strike");

            let first = drills.save(drill(&name, 0)).await.unwrap();
            let err = drills
                .save(drill(&name.to_uppercase(), 0))
                .await
                .unwrap_err();

            match err {
                ServiceError::Insert(e) => assert_eq!(e.message(), "Name already exists."),
                other => panic!("unexpected error: {other}"),
            }

            drills.delete_by_id(first.id.unwrap()).await.unwrap();
        }

        #[tokio::test]
        #[ignore = "requires database"]
        async fn update_replaces_instruction_list() {
            let pool = pool().await;
            let drills = DrillService::new(&pool);

            let saved = drills.save(drill(&unique("Knee strike"), 3)).await.unwrap();
            let id = saved.id.unwrap();

            let mut shorter = saved.clone();
            shorter.instructions.truncate(1);
            drills.save(shorter).await.unwrap();

            let loaded = drills.find_by_id(id).await.unwrap().unwrap();
            assert_eq!(loaded.instructions.len(), 1);
            assert_eq!(loaded.instructions[0].number, 1);

            drills.delete_by_id(id).await.unwrap();
        }
    }
}
