use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bank::{
    effects::{Effect, Submission, SubmissionStatus, Variant},
    stats::VoteAggregate,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tokio::task::spawn_blocking;

use super::{EffectRepository, aggregate_after};
use crate::{
    database::init_sqlite,
    error::{StoreError, StoreResult},
};

const EFFECT_COLUMNS: &str = "id, category, category_emoji, category_name, title, question, \
     variant_a, variant_b, votes_a, votes_b, current_state, source_link, date_added";

/// Relational store. Every call runs on the blocking pool against one shared connection.
#[derive(Clone)]
pub struct SqlRepository {
    connection: Arc<Mutex<Connection>>,
}

impl SqlRepository {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self::from_connection(init_sqlite(path)?))
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();

        spawn_blocking(move || {
            let mut connection = connection.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut *connection)
        })
        .await?
    }

    /// Upserts a whole catalog in one transaction, returns how many rows were written.
    pub async fn import(&self, effects: Vec<Effect>) -> StoreResult<usize> {
        self.call(move |connection| {
            let tx = connection.transaction()?;
            {
                let mut statement = tx.prepare(&format!(
                    "INSERT OR REPLACE INTO effects ({EFFECT_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ))?;

                for effect in &effects {
                    statement.execute(params![
                        effect.id,
                        effect.category,
                        effect.category_emoji,
                        effect.category_name,
                        effect.title,
                        effect.question,
                        effect.variant_a,
                        effect.variant_b,
                        effect.votes_a as i64,
                        effect.votes_b as i64,
                        effect.current_state,
                        effect.source_link,
                        effect.date_added,
                    ])?;
                }
            }
            tx.commit()?;

            Ok(effects.len())
        })
        .await
    }
}

fn effect_from_row(row: &Row<'_>) -> rusqlite::Result<Effect> {
    Ok(Effect {
        id: row.get("id")?,
        category: row.get("category")?,
        category_emoji: row.get("category_emoji")?,
        category_name: row.get("category_name")?,
        title: row.get("title")?,
        question: row.get("question")?,
        variant_a: row.get("variant_a")?,
        variant_b: row.get("variant_b")?,
        votes_a: row.get::<_, i64>("votes_a")?.max(0) as u64,
        votes_b: row.get::<_, i64>("votes_b")?.max(0) as u64,
        current_state: row.get("current_state")?,
        source_link: row.get("source_link")?,
        date_added: row.get("date_added")?,
    })
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get("id")?,
        title: row.get("title")?,
        question: row.get("question")?,
        variant_a: row.get("variant_a")?,
        variant_b: row.get("variant_b")?,
        category: row.get("category")?,
        source_link: row.get("source_link")?,
        submitted_at: row.get("submitted_at")?,
        status: SubmissionStatus::Pending,
    })
}

#[async_trait]
impl EffectRepository for SqlRepository {
    async fn list(&self, category: Option<&str>) -> StoreResult<Vec<Effect>> {
        let category = category.map(str::to_string);

        self.call(move |connection| {
            let mut statement = connection.prepare(&format!(
                "SELECT {EFFECT_COLUMNS} FROM effects \
                 WHERE ?1 IS NULL OR category = ?1 ORDER BY id"
            ))?;

            let effects = statement
                .query_map(params![category], effect_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(effects)
        })
        .await
    }

    async fn get(&self, id: u32) -> StoreResult<Effect> {
        self.call(move |connection| {
            connection
                .query_row(
                    &format!("SELECT {EFFECT_COLUMNS} FROM effects WHERE id = ?1"),
                    params![id],
                    effect_from_row,
                )
                .optional()?
                .ok_or(StoreError::NotFound(id))
        })
        .await
    }

    async fn increment(&self, id: u32, variant: Variant) -> StoreResult<VoteAggregate> {
        // the increment happens inside SQLite, no read-modify-write here
        let sql = match variant {
            Variant::A => {
                "UPDATE effects SET votes_a = votes_a + 1 WHERE id = ?1 \
                 RETURNING votes_a, votes_b"
            }
            Variant::B => {
                "UPDATE effects SET votes_b = votes_b + 1 WHERE id = ?1 \
                 RETURNING votes_b, votes_a"
            }
        };

        self.call(move |connection| {
            let (count, other) = connection
                .query_row(sql, params![id], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
                })
                .optional()?
                .ok_or(StoreError::NotFound(id))?;

            Ok(aggregate_after(variant, count as u64, other as u64))
        })
        .await
    }

    async fn delete(&self, id: u32) -> StoreResult<()> {
        self.call(move |connection| {
            match connection.execute("DELETE FROM effects WHERE id = ?1", params![id])? {
                0 => Err(StoreError::NotFound(id)),
                _ => Ok(()),
            }
        })
        .await
    }

    async fn add_submission(&self, submission: Submission) -> StoreResult<()> {
        self.call(move |connection| {
            connection.execute(
                "INSERT INTO submissions \
                 (id, title, question, variant_a, variant_b, category, source_link, \
                 submitted_at, status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending')",
                params![
                    submission.id,
                    submission.title,
                    submission.question,
                    submission.variant_a,
                    submission.variant_b,
                    submission.category,
                    submission.source_link,
                    submission.submitted_at,
                ],
            )?;

            Ok(())
        })
        .await
    }

    async fn submissions(&self) -> StoreResult<Vec<Submission>> {
        self.call(|connection| {
            let mut statement = connection.prepare(
                "SELECT id, title, question, variant_a, variant_b, category, source_link, \
                 submitted_at \
                 FROM submissions WHERE status = 'pending' ORDER BY submitted_at",
            )?;

            let submissions = statement
                .query_map([], submission_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(submissions)
        })
        .await
    }
}
