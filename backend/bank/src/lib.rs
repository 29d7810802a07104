use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Error, bail};
use regex::Regex;

pub mod effects;
pub mod flavor;
pub mod radar;
pub mod remote;
pub mod stats;

use effects::Effect;

/// In-memory catalog with an id to position index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub effects: Vec<Effect>,
    pub id_to_index: HashMap<u32, usize>,
}

impl Catalog {
    pub fn new(effects: Vec<Effect>) -> Result<Self, Error> {
        let mut id_to_index = HashMap::with_capacity(effects.len());

        for (index, effect) in effects.iter().enumerate() {
            if id_to_index.insert(effect.id, index).is_some() {
                bail!("Duplicate effect id {}", effect.id);
            }
        }

        Ok(Self {
            effects,
            id_to_index,
        })
    }

    pub fn get(&self, id: u32) -> Option<&Effect> {
        let index = *self.id_to_index.get(&id)?;
        self.effects.get(index)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Effect> {
        let index = *self.id_to_index.get(&id)?;
        self.effects.get_mut(index)
    }

    pub fn remove(&mut self, id: u32) -> Option<Effect> {
        let index = self.id_to_index.remove(&id)?;
        let effect = self.effects.remove(index);

        for position in self.id_to_index.values_mut() {
            if *position > index {
                *position -= 1;
            }
        }

        Some(effect)
    }
}

pub fn decode_catalog(bytes: &[u8]) -> Result<Vec<Effect>, Error> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn get_catalog(path: impl AsRef<Path>) -> Result<Catalog, Error> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    Catalog::new(decode_catalog(&data)?)
}

/// Writes to a sibling temp file first so readers never see a half written catalog.
pub fn write_catalog(path: impl AsRef<Path>, effects: &[Effect]) -> Result<(), Error> {
    write_json(path, effects)
}

pub fn write_json<T>(path: impl AsRef<Path>, value: &T) -> Result<(), Error>
where
    T: serde::Serialize + ?Sized,
{
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, serde_json::to_vec(value)?)?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

/// Category ids are lowercase, dash separated slugs.
pub fn sanitize(input: &str) -> String {
    let replace = Regex::new(r"[_\s&/]+").unwrap();
    let mut s = replace.replace_all(input, " ").into_owned();

    let clean_re = Regex::new(r"[^A-Za-z0-9- ]").unwrap();
    s = clean_re.replace_all(&s, "").into_owned();

    s = s.trim().to_string();

    let collapse = Regex::new(r"[ -]+").unwrap();
    collapse.replace_all(&s, "-").into_owned().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::effect;

    #[test]
    fn test_basic() {
        assert_eq!(sanitize("Movies_TV"), "movies-tv");
        assert_eq!(sanitize("Film & TV"), "film-tv");
        assert_eq!(sanitize("brands!"), "brands");
    }

    #[test]
    fn test_leading_trailing_spaces() {
        assert_eq!(sanitize("   logos   "), "logos");
        assert_eq!(sanitize("  pop   culture  "), "pop-culture");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(sanitize("!@#$%^&*()"), "");
        assert_eq!(sanitize("abc123!@#"), "abc123");
    }

    #[test]
    fn test_dashes_collapse() {
        assert_eq!(sanitize("geo -- graphy"), "geo-graphy");
        assert_eq!(sanitize("_start_end_"), "start-end");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("     "), "");
    }

    #[test]
    fn test_catalog_index() {
        let mut catalog = Catalog::new(vec![
            effect(4, "a", 0, 0),
            effect(9, "b", 0, 0),
            effect(2, "a", 0, 0),
        ])
        .unwrap();

        assert_eq!(catalog.get(9).map(|e| e.category.as_str()), Some("b"));
        assert!(catalog.get(1).is_none());

        catalog.remove(4).unwrap();
        assert_eq!(catalog.get(2).map(|e| e.id), Some(2));
        assert_eq!(catalog.get(9).map(|e| e.id), Some(9));
        assert_eq!(catalog.effects.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        assert!(Catalog::new(vec![effect(1, "a", 0, 0), effect(1, "b", 0, 0)]).is_err());
    }

    #[test]
    fn test_catalog_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("effects.json");

        write_catalog(&path, &[effect(1, "a", 3, 4)]).unwrap();
        let catalog = get_catalog(&path).unwrap();

        assert_eq!(catalog.effects, vec![effect(1, "a", 3, 4)]);
        assert!(!path.with_extension("tmp").exists());
    }
}
