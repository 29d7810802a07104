use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use bank::{
    Catalog, decode_catalog,
    effects::{Effect, Submission, Variant},
    stats::VoteAggregate,
};
use tokio::{fs, sync::Mutex, task::spawn_blocking};

use super::EffectRepository;
use crate::error::{StoreError, StoreResult};

/// Flat file store. Reads go straight to disk, writers queue on one lock and replace the file
/// atomically, so concurrent votes are serialized and never lost.
pub struct JsonRepository {
    catalog_path: PathBuf,
    submissions_path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRepository {
    pub fn open(catalog_path: &Path, submissions_path: &Path) -> StoreResult<Self> {
        // fail at startup rather than on the first request
        bank::get_catalog(catalog_path)?;

        Ok(Self {
            catalog_path: catalog_path.to_path_buf(),
            submissions_path: submissions_path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    async fn load(&self) -> StoreResult<Catalog> {
        let bytes = fs::read(&self.catalog_path).await?;

        Ok(Catalog::new(decode_catalog(&bytes)?)?)
    }

    async fn save(&self, effects: Vec<Effect>) -> StoreResult<()> {
        let path = self.catalog_path.clone();
        spawn_blocking(move || bank::write_catalog(&path, &effects)).await??;

        Ok(())
    }

    async fn load_submissions(&self) -> StoreResult<Vec<Submission>> {
        match fs::read(&self.submissions_path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl EffectRepository for JsonRepository {
    async fn list(&self, category: Option<&str>) -> StoreResult<Vec<Effect>> {
        let catalog = self.load().await?;

        Ok(match category {
            Some(category) => catalog
                .effects
                .into_iter()
                .filter(|e| e.category == category)
                .collect(),
            None => catalog.effects,
        })
    }

    async fn get(&self, id: u32) -> StoreResult<Effect> {
        let catalog = self.load().await?;

        catalog.get(id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn increment(&self, id: u32, variant: Variant) -> StoreResult<VoteAggregate> {
        let _guard = self.write_lock.lock().await;

        let mut catalog = self.load().await?;
        let effect = catalog.get_mut(id).ok_or(StoreError::NotFound(id))?;
        *effect.votes_mut(variant) += 1;
        let aggregate = VoteAggregate::of(effect);

        self.save(catalog.effects).await?;

        Ok(aggregate)
    }

    async fn delete(&self, id: u32) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut catalog = self.load().await?;
        catalog.remove(id).ok_or(StoreError::NotFound(id))?;

        self.save(catalog.effects).await
    }

    async fn add_submission(&self, submission: Submission) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut submissions = self.load_submissions().await?;
        submissions.push(submission);

        let path = self.submissions_path.clone();
        spawn_blocking(move || bank::write_json(&path, &submissions)).await??;

        Ok(())
    }

    async fn submissions(&self) -> StoreResult<Vec<Submission>> {
        self.load_submissions().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bank::effects::SubmissionStatus;
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    use super::*;

    fn effect(id: u32, category: &str, votes_a: u64, votes_b: u64) -> Effect {
        Effect {
            id,
            category: category.to_string(),
            category_emoji: "🎬".to_string(),
            category_name: category.to_string(),
            title: format!("Effect {id}"),
            question: "Which one?".to_string(),
            variant_a: "first".to_string(),
            variant_b: "second".to_string(),
            votes_a,
            votes_b,
            current_state: "second".to_string(),
            source_link: String::new(),
            date_added: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    fn repository(effects: &[Effect]) -> (TempDir, JsonRepository) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("effects.json");
        bank::write_catalog(&catalog, effects).unwrap();

        let repository =
            JsonRepository::open(&catalog, &dir.path().join("submissions.json")).unwrap();
        (dir, repository)
    }

    #[tokio::test]
    async fn test_list_and_filter() {
        let (_dir, repo) = repository(&[effect(1, "movies", 0, 0), effect(2, "brands", 0, 0)]);

        assert_eq!(repo.all().await.unwrap().len(), 2);

        let brands = repo.list(Some("brands")).await.unwrap();
        assert_eq!(brands.len(), 1);
        assert_eq!(brands[0].id, 2);

        assert!(matches!(repo.get(3).await, Err(StoreError::NotFound(3))));
    }

    #[tokio::test]
    async fn test_increment_persists() {
        let (dir, repo) = repository(&[effect(1, "movies", 3, 6)]);

        let aggregate = repo.increment(1, Variant::B).await.unwrap();
        assert_eq!((aggregate.votes_for, aggregate.votes_against), (3, 7));
        assert_eq!(aggregate.percent_for, 30.0);

        let on_disk = bank::get_catalog(dir.path().join("effects.json")).unwrap();
        assert_eq!(on_disk.get(1).unwrap().votes_b, 7);
        assert_eq!(on_disk.get(1).unwrap().votes_a, 3);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let (_dir, repo) = repository(&[effect(1, "movies", 5, 0)]);
        let repo = Arc::new(repo);

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.increment(1, Variant::A).await })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repo.get(1).await.unwrap().votes_a, 15);
    }

    #[tokio::test]
    async fn test_increment_missing() {
        let (_dir, repo) = repository(&[effect(1, "movies", 0, 0)]);

        assert!(matches!(
            repo.increment(9, Variant::A).await,
            Err(StoreError::NotFound(9))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_submissions() {
        let (_dir, repo) = repository(&[effect(1, "movies", 0, 0), effect(2, "movies", 0, 0)]);

        repo.delete(1).await.unwrap();
        assert!(matches!(repo.delete(1).await, Err(StoreError::NotFound(1))));
        assert_eq!(repo.all().await.unwrap().len(), 1);

        assert!(repo.submissions().await.unwrap().is_empty());

        let submission = Submission {
            id: "sub-1".to_string(),
            title: "Monopoly Man".to_string(),
            question: "Does he wear a monocle?".to_string(),
            variant_a: "Monocle".to_string(),
            variant_b: "No monocle".to_string(),
            category: "brands".to_string(),
            source_link: None,
            submitted_at: Utc::now(),
            status: SubmissionStatus::Pending,
        };
        repo.add_submission(submission.clone()).await.unwrap();

        assert_eq!(repo.submissions().await.unwrap(), vec![submission]);
    }

    #[test]
    fn test_open_requires_catalog() {
        let dir = tempfile::tempdir().unwrap();

        assert!(
            JsonRepository::open(&dir.path().join("missing.json"), &dir.path().join("s.json"))
                .is_err()
        );
    }
}
