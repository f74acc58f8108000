//! The persistence boundary: snapshotting story graphs in and out of the
//! engine.
//!
//! The platform backend implements [`StoryStore`] over whatever transport
//! it likes; [`FileStore`] is the local reference implementation (a
//! directory of RON files) used by the tools, demos, and tests. Saving and
//! loading move the whole graph at once, choice lists and id counters
//! included, so a load always resumes exactly where the save left off.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::schema::story::StoryGraph;

/// Opaque story identifier assigned by a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(pub String);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    RonSer(#[from] ron::Error),
    #[error("RON parse error: {0}")]
    RonDe(#[from] ron::error::SpannedError),
    #[error("story not found: {0}")]
    NotFound(StoryId),
}

/// Where story snapshots live.
///
/// `save` with `None` asks the store to allocate a fresh id; passing an id
/// back on later saves overwrites that record in place.
pub trait StoryStore {
    fn save(&mut self, id: Option<&StoryId>, story: &StoryGraph) -> Result<StoryId, StoreError>;
    fn load(&self, id: &StoryId) -> Result<StoryGraph, StoreError>;
}

/// A directory of `story-N.ron` files with sequential id allocation.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &StoryId) -> PathBuf {
        self.dir.join(format!("{}.ron", id.0))
    }

    /// Next unused `story-N` id in this directory.
    fn allocate_id(&self) -> Result<StoryId, StoreError> {
        let mut highest = 0u64;
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let name = entry?.file_name();
                let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".ron")) else {
                    continue;
                };
                if let Some(n) = stem.strip_prefix("story-").and_then(|n| n.parse::<u64>().ok()) {
                    highest = highest.max(n);
                }
            }
        }
        Ok(StoryId(format!("story-{}", highest + 1)))
    }
}

impl StoryStore for FileStore {
    fn save(&mut self, id: Option<&StoryId>, story: &StoryGraph) -> Result<StoryId, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let id = match id {
            Some(id) => id.clone(),
            None => self.allocate_id()?,
        };
        let contents = ron::ser::to_string_pretty(story, ron::ser::PrettyConfig::default())?;
        fs::write(self.path_for(&id), contents)?;
        Ok(id)
    }

    fn load(&self, id: &StoryId) -> Result<StoryGraph, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(ron::from_str(&fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::story::StoryMeta;

    fn make_story(title: &str) -> StoryGraph {
        StoryGraph::new(StoryMeta::titled(title))
    }

    #[test]
    fn save_allocates_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        let first = store.save(None, &make_story("First")).unwrap();
        let second = store.save(None, &make_story("Second")).unwrap();
        assert_eq!(first, StoryId("story-1".to_string()));
        assert_eq!(second, StoryId("story-2".to_string()));
    }

    #[test]
    fn save_then_load_round_trips_the_graph() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        let mut story = make_story("Round trip");
        let scene_id = story.mint_scene_id();
        story.scenes.push(crate::schema::scene::Scene {
            id: scene_id,
            title: "Opening".to_string(),
            content: "It begins.".to_string(),
            image: None,
            audio: None,
            sound_effects: Vec::new(),
            choices: Vec::new(),
            order_index: 0,
        });

        let id = store.save(None, &story).unwrap();
        let mut loaded = store.load(&id).unwrap();
        assert_eq!(loaded, story);
        // The counters came back too: minting continues past the old ids.
        assert_eq!(loaded.mint_scene_id().0, 2);
    }

    #[test]
    fn saving_with_an_id_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        let id = store.save(None, &make_story("Draft")).unwrap();
        let resaved = store.save(Some(&id), &make_story("Final")).unwrap();
        assert_eq!(resaved, id);
        assert_eq!(store.load(&id).unwrap().meta.title, "Final");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn loading_a_missing_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let missing = StoryId("story-9".to_string());
        assert!(matches!(
            store.load(&missing),
            Err(StoreError::NotFound(id)) if id == missing
        ));
    }

    #[test]
    fn corrupt_files_surface_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        fs::write(dir.path().join("story-1.ron"), "(not a story").unwrap();
        assert!(matches!(
            store.load(&StoryId("story-1".to_string())),
            Err(StoreError::RonDe(_))
        ));
    }

    #[test]
    fn unrelated_files_do_not_disturb_allocation() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "scratch").unwrap();
        fs::write(dir.path().join("story-7.ron"), "placeholder").unwrap();

        let mut store = FileStore::new(dir.path());
        let id = store.save(None, &make_story("Next")).unwrap();
        assert_eq!(id, StoryId("story-8".to_string()));
    }
}
