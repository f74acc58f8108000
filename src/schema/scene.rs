use serde::{Deserialize, Serialize};
use std::fmt;

use super::choice::{Choice, ChoiceId};

/// Newtype wrapper for scene ids. Minted by the owning story graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub u64);

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque handle to uploaded media, produced by the platform's media
/// service and stored verbatim. The engine never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub String);

impl MediaRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }
}

/// A narrative node: the text a player reads plus the ordered choices that
/// leave it.
///
/// `order_index` places the scene in the authoring list and nothing else;
/// traversal only ever follows choice destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<MediaRef>,
    #[serde(default)]
    pub audio: Option<MediaRef>,
    #[serde(default)]
    pub sound_effects: Vec<MediaRef>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub order_index: usize,
}

impl Scene {
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == id)
    }

    pub fn choice_mut(&mut self, id: ChoiceId) -> Option<&mut Choice> {
        self.choices.iter_mut().find(|choice| choice.id == id)
    }

    /// Choices sorted by their order index, for display.
    pub fn ordered_choices(&self) -> Vec<&Choice> {
        let mut choices: Vec<&Choice> = self.choices.iter().collect();
        choices.sort_by_key(|choice| (choice.order_index, choice.id));
        choices
    }
}
