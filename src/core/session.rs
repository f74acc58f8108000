//! The authoring session: the single mutable owner of a story graph while
//! it is being edited.
//!
//! Every structural edit flows through here. Lookups that miss are silent
//! no-ops rather than errors: the UI can race a deletion against an
//! in-flight edit, and losing that race is benign. A miss never marks the
//! session dirty.

use std::collections::HashMap;

use crate::core::reorder;
use crate::schema::choice::{Choice, ChoiceId, Destination};
use crate::schema::scene::{MediaRef, Scene, SceneId};
use crate::schema::story::{StoryGraph, StoryMeta};
use crate::store::{StoreError, StoryId, StoryStore};

/// Label given to a freshly added choice until the author renames it.
pub const NEW_CHOICE_TEXT: &str = "New choice";

/// A field-granular update to a scene. `None` leaves a field alone; the
/// doubled options can also clear a media slot back to empty.
#[derive(Debug, Clone, Default)]
pub struct ScenePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<Option<MediaRef>>,
    pub audio: Option<Option<MediaRef>>,
    pub sound_effects: Option<Vec<MediaRef>>,
    pub order_index: Option<usize>,
}

/// A field-granular update to a choice. The doubled option on `next`
/// distinguishes "leave it alone" (outer `None`) from "clear it back to
/// unset" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct ChoicePatch {
    pub text: Option<String>,
    pub next: Option<Option<Destination>>,
    pub consequences: Option<HashMap<String, i64>>,
    pub requirements: Option<HashMap<String, i64>>,
}

/// In-memory editing state for one story.
///
/// Holds the graph, the id it was loaded under (if any), the scene the
/// editor has focused, and a dirty flag that tracks unsaved changes.
#[derive(Debug, Clone)]
pub struct AuthoringSession {
    story: StoryGraph,
    story_id: Option<StoryId>,
    selected: Option<SceneId>,
    dirty: bool,
}

impl AuthoringSession {
    /// Begin authoring a brand-new, empty story.
    pub fn new(meta: StoryMeta) -> Self {
        Self {
            story: StoryGraph::new(meta),
            story_id: None,
            selected: None,
            dirty: false,
        }
    }

    /// Resume authoring an already-built graph (a deserialized snapshot,
    /// or one assembled in code).
    pub fn from_story(story: StoryGraph) -> Self {
        Self {
            story,
            story_id: None,
            selected: None,
            dirty: false,
        }
    }

    /// Load a story from a store and open it for editing. Later saves go
    /// back to the same record.
    pub fn open<S: StoryStore + ?Sized>(store: &S, id: &StoryId) -> Result<Self, StoreError> {
        let story = store.load(id)?;
        Ok(Self {
            story,
            story_id: Some(id.clone()),
            selected: None,
            dirty: false,
        })
    }

    pub fn story(&self) -> &StoryGraph {
        &self.story
    }

    pub fn into_story(self) -> StoryGraph {
        self.story
    }

    pub fn story_id(&self) -> Option<&StoryId> {
        self.story_id.as_ref()
    }

    pub fn selected_scene(&self) -> Option<SceneId> {
        self.selected
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the story metadata wholesale.
    pub fn set_meta(&mut self, meta: StoryMeta) {
        self.story.meta = meta;
        self.dirty = true;
    }

    /// Create an empty scene at the end of the authoring list and return
    /// its id.
    pub fn add_scene(&mut self) -> SceneId {
        let id = self.story.mint_scene_id();
        let order_index = self.story.scenes.len();
        self.story.scenes.push(Scene {
            id,
            title: String::new(),
            content: String::new(),
            image: None,
            audio: None,
            sound_effects: Vec::new(),
            choices: Vec::new(),
            order_index,
        });
        self.dirty = true;
        id
    }

    /// Merge a patch into the named scene. Unknown ids are ignored.
    pub fn update_scene(&mut self, id: SceneId, patch: ScenePatch) {
        let Some(scene) = self.story.scene_mut(id) else {
            return;
        };
        if let Some(title) = patch.title {
            scene.title = title;
        }
        if let Some(content) = patch.content {
            scene.content = content;
        }
        if let Some(image) = patch.image {
            scene.image = image;
        }
        if let Some(audio) = patch.audio {
            scene.audio = audio;
        }
        if let Some(sound_effects) = patch.sound_effects {
            scene.sound_effects = sound_effects;
        }
        if let Some(order_index) = patch.order_index {
            scene.order_index = order_index;
        }
        self.dirty = true;
    }

    /// Remove a scene. Destinations elsewhere that pointed at it are left
    /// dangling on purpose: a playthrough resolves them as endings and the
    /// lint layer reports them. Clears the selection if it pointed at the
    /// removed scene.
    pub fn delete_scene(&mut self, id: SceneId) {
        let before = self.story.scenes.len();
        self.story.scenes.retain(|scene| scene.id != id);
        if self.story.scenes.len() == before {
            return;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.dirty = true;
    }

    /// Focus a scene for editing. Selection is editor state, not story
    /// data, so it never dirties the session. Unknown ids are ignored.
    pub fn select_scene(&mut self, id: SceneId) {
        if self.story.scene(id).is_some() {
            self.selected = Some(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Append a fresh choice to a scene: placeholder text, no destination,
    /// no consequences or requirements. Returns the new id, or `None` when
    /// the scene is unknown.
    pub fn add_choice(&mut self, scene_id: SceneId) -> Option<ChoiceId> {
        self.story.scene(scene_id)?;
        let id = self.story.mint_choice_id();
        let scene = self.story.scene_mut(scene_id)?;
        let order_index = scene.choices.len();
        scene.choices.push(Choice {
            id,
            text: NEW_CHOICE_TEXT.to_string(),
            next: None,
            consequences: HashMap::new(),
            requirements: HashMap::new(),
            order_index,
        });
        self.dirty = true;
        Some(id)
    }

    /// Merge a patch into a choice. A miss on either id is ignored.
    pub fn update_choice(&mut self, scene_id: SceneId, choice_id: ChoiceId, patch: ChoicePatch) {
        let Some(scene) = self.story.scene_mut(scene_id) else {
            return;
        };
        let Some(choice) = scene.choice_mut(choice_id) else {
            return;
        };
        if let Some(text) = patch.text {
            choice.text = text;
        }
        if let Some(next) = patch.next {
            choice.next = next;
        }
        if let Some(consequences) = patch.consequences {
            choice.consequences = consequences;
        }
        if let Some(requirements) = patch.requirements {
            choice.requirements = requirements;
        }
        self.dirty = true;
    }

    /// Remove a choice. Surviving order indices are NOT rewritten here;
    /// call [`renumber_choices`](Self::renumber_choices) afterwards to
    /// restore the 0..n-1 contract.
    pub fn delete_choice(&mut self, scene_id: SceneId, choice_id: ChoiceId) {
        let Some(scene) = self.story.scene_mut(scene_id) else {
            return;
        };
        let before = scene.choices.len();
        scene.choices.retain(|choice| choice.id != choice_id);
        if scene.choices.len() != before {
            self.dirty = true;
        }
    }

    /// Rewrite a scene's choice order indices to match list positions.
    pub fn renumber_choices(&mut self, scene_id: SceneId) {
        let Some(scene) = self.story.scene_mut(scene_id) else {
            return;
        };
        reorder::renumber(&mut scene.choices);
        self.dirty = true;
    }

    /// Feed one drag-move event through the reorder engine. Returns
    /// whether a move committed.
    pub fn drag_choice(
        &mut self,
        scene_id: SceneId,
        drag_index: usize,
        hover_index: usize,
        pointer_y: f32,
        row_height: f32,
    ) -> bool {
        let Some(scene) = self.story.scene_mut(scene_id) else {
            return false;
        };
        let moved = reorder::drag_update(
            &mut scene.choices,
            drag_index,
            hover_index,
            pointer_y,
            row_height,
        );
        if moved {
            self.dirty = true;
        }
        moved
    }

    /// Snapshot the story through the persistence boundary. The first save
    /// lets the store allocate an id; later saves overwrite the same
    /// record. A failed save leaves the session untouched, dirty flag
    /// included.
    pub fn save<S: StoryStore + ?Sized>(&mut self, store: &mut S) -> Result<StoryId, StoreError> {
        let id = store.save(self.story_id.as_ref(), &self.story)?;
        self.story_id = Some(id.clone());
        self.dirty = false;
        Ok(id)
    }
}
