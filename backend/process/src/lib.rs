//! # Catalog tooling
//!
//! Offline jobs around the effect catalog.
//!
//! ## Normalize
//! 1. Load the JSON catalog, duplicate ids abort the run.
//! 2. Slug every category id, trim every text field.
//! 3. Sort by id, print anything that still looks broken, write the file back.
//!
//! ## Seed
//! 1. Load the JSON catalog.
//! 2. Create the SQLite schema if missing.
//! 3. Upsert every record in batches, the counts in the file win over the database.
//!
//! ## Hash password
//! Prints the argon2 hash to put in the `ADMIN_PASSWORD_HASH` secret.
use std::path::Path;

use anyhow::Error;
use bank::{
    Catalog, get_catalog,
    stats::{CategorySummary, SiteStats, summarize_categories},
    write_catalog,
};
use indicatif::{ProgressBar, ProgressStyle};
use server::{auth::hash_password, repository::sql::SqlRepository};

pub mod utils;

use utils::{lint_effects, normalize_effects};

const SEED_BATCH: usize = 100;

pub fn normalize_catalog(input: &Path, output: &Path) -> Result<usize, Error> {
    let Catalog { mut effects, .. } = get_catalog(input)?;
    println!("Loaded Effects: {}", effects.len());

    let changed = normalize_effects(&mut effects);
    println!("Normalized Effects: {changed}");

    // re-check ids and write only a catalog the server would accept
    let catalog = Catalog::new(effects)?;

    for problem in lint_effects(&catalog.effects) {
        println!("Warning: {problem}");
    }

    write_catalog(output, &catalog.effects)?;

    Ok(changed)
}

pub async fn seed_database(catalog: &Path, database: &Path) -> Result<usize, Error> {
    let Catalog { effects, .. } = get_catalog(catalog)?;
    let repository = SqlRepository::open(database)?;

    let pb = ProgressBar::new(effects.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut seeded = 0;
    for batch in effects.chunks(SEED_BATCH) {
        pb.set_message(format!("Seeding from id {}", batch[0].id));

        seeded += repository.import(batch.to_vec()).await?;
        pb.inc(batch.len() as u64);
    }

    pb.finish_with_message("Done");

    Ok(seeded)
}

pub fn hash_admin_password(password: &str) -> Result<String, Error> {
    if password.len() < 8 {
        anyhow::bail!("Admin password must be at least 8 characters");
    }

    Ok(hash_password(password)?)
}

pub fn summarize(catalog: &Path) -> Result<(SiteStats, Vec<CategorySummary>), Error> {
    let Catalog { effects, .. } = get_catalog(catalog)?;

    Ok((SiteStats::from_effects(&effects), summarize_categories(&effects)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use server::repository::EffectRepository;

    use super::*;
    use bank::effects::Effect;

    fn effect(id: u32, category: &str, votes_a: u64) -> Effect {
        Effect {
            id,
            category: category.to_string(),
            category_emoji: "🍫".to_string(),
            category_name: "Food".to_string(),
            title: "Kit Kat".to_string(),
            question: "Is there a dash?".to_string(),
            variant_a: "Kit-Kat".to_string(),
            variant_b: "KitKat".to_string(),
            votes_a,
            votes_b: 2,
            current_state: "KitKat".to_string(),
            source_link: String::new(),
            date_added: NaiveDate::from_ymd_opt(2021, 4, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_seed_database() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("effects.json");
        let database = dir.path().join("db").join("effects.db");

        let effects: Vec<Effect> = (1..=250).map(|id| effect(id, "food", id as u64)).collect();
        write_catalog(&catalog, &effects).unwrap();

        assert_eq!(seed_database(&catalog, &database).await.unwrap(), 250);
        // seeding twice upserts instead of duplicating
        assert_eq!(seed_database(&catalog, &database).await.unwrap(), 250);

        let repository = SqlRepository::open(&database).unwrap();
        let stored = repository.all().await.unwrap();
        assert_eq!(stored.len(), 250);
        assert_eq!(stored[249], effects[249]);
    }

    #[test]
    fn test_normalize_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.json");
        let output = dir.path().join("effects.json");

        write_catalog(&input, &[effect(2, "Food & Drink", 0), effect(1, "food-drink", 0)]).unwrap();

        assert_eq!(normalize_catalog(&input, &output).unwrap(), 1);

        let catalog = get_catalog(&output).unwrap();
        let categories: Vec<&str> = catalog.effects.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, ["food-drink", "food-drink"]);
        assert_eq!(catalog.effects[0].id, 1);
    }

    #[test]
    fn test_hash_admin_password() {
        assert!(hash_admin_password("short").is_err());
        assert!(hash_admin_password("long-enough-password").unwrap().starts_with("$argon2"));
    }

    #[test]
    fn test_summarize() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("effects.json");
        write_catalog(&catalog, &[effect(1, "food", 4), effect(2, "food", 1)]).unwrap();

        let (stats, categories) = summarize(&catalog).unwrap();
        assert_eq!(stats.total_votes, 9);
        assert_eq!(stats.estimated_participants, 3);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].count, 2);
    }
}
