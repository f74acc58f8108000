use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::choice::ChoiceId;
use super::scene::{Scene, SceneId};

/// How the platform charges for a story. Carried for the storefront; the
/// engine itself never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Monetization {
    #[default]
    Free,
    Premium {
        price_cents: u32,
    },
    SubscriberOnly,
}

/// Story-level metadata: discovery and storefront fields, opaque to the
/// engine core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryMeta {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: FxHashSet<String>,
    #[serde(default)]
    pub monetization: Monetization,
}

impl StoryMeta {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// The full branching story: every scene plus its metadata.
///
/// The graph hands out fresh ids through private counters. The counters
/// are persisted with the graph, and minting never goes below
/// `max(existing id) + 1` either, so a hand-edited story file cannot make
/// the graph hand out an id that is already in use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryGraph {
    pub meta: StoryMeta,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    next_scene_id: u64,
    #[serde(default)]
    next_choice_id: u64,
}

impl StoryGraph {
    pub fn new(meta: StoryMeta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|scene| scene.id == id)
    }

    /// Scenes sorted by their authoring-list position.
    pub fn ordered_scenes(&self) -> Vec<&Scene> {
        let mut scenes: Vec<&Scene> = self.scenes.iter().collect();
        scenes.sort_by_key(|scene| (scene.order_index, scene.id));
        scenes
    }

    /// The scene a playthrough opens on: lowest `order_index`, ties broken
    /// by id. `None` only for an empty story.
    pub fn first_scene(&self) -> Option<&Scene> {
        self.scenes.iter().min_by_key(|scene| (scene.order_index, scene.id))
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub(crate) fn mint_scene_id(&mut self) -> SceneId {
        let floor = self
            .scenes
            .iter()
            .map(|scene| scene.id.0)
            .max()
            .map_or(1, |highest| highest + 1);
        let id = self.next_scene_id.max(floor);
        self.next_scene_id = id + 1;
        SceneId(id)
    }

    pub(crate) fn mint_choice_id(&mut self) -> ChoiceId {
        let floor = self
            .scenes
            .iter()
            .flat_map(|scene| scene.choices.iter())
            .map(|choice| choice.id.0)
            .max()
            .map_or(1, |highest| highest + 1);
        let id = self.next_choice_id.max(floor);
        self.next_choice_id = id + 1;
        ChoiceId(id)
    }
}
