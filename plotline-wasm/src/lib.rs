//! WASM bindings for plotline: powers the web authoring studio and the
//! in-browser story preview.

use std::collections::HashMap;
use wasm_bindgen::prelude::*;

use plotline::core::lint::lint;
use plotline::core::playthrough::{Frame, Playthrough};
use plotline::core::session::{AuthoringSession, ChoicePatch, ScenePatch};
use plotline::core::walker::{random_walk, WalkConfig};
use plotline::schema::choice::{Choice, ChoiceId, Destination};
use plotline::schema::scene::{MediaRef, Scene, SceneId};
use plotline::schema::stats::Stats;
use plotline::schema::story::{Monetization, StoryGraph, StoryMeta};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------

/// Absent field = leave it alone, `null` = clear it, value = set it.
fn tri_state<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DestinationInput {
    End,
    Scene { id: u64 },
}

#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum MonetizationInput {
    Free,
    Premium { price_cents: u32 },
    SubscriberOnly,
}

#[derive(serde::Deserialize)]
struct MetaInput {
    title: String,
    category: Option<String>,
    tags: Option<Vec<String>>,
    monetization: Option<MonetizationInput>,
}

#[derive(serde::Deserialize)]
struct ScenePatchInput {
    scene_id: u64,
    title: Option<String>,
    content: Option<String>,
    #[serde(default, deserialize_with = "tri_state")]
    image: Option<Option<String>>,
    #[serde(default, deserialize_with = "tri_state")]
    audio: Option<Option<String>>,
    sound_effects: Option<Vec<String>>,
    order_index: Option<usize>,
}

#[derive(serde::Deserialize)]
struct ChoicePatchInput {
    scene_id: u64,
    choice_id: u64,
    text: Option<String>,
    #[serde(default, deserialize_with = "tri_state")]
    next: Option<Option<DestinationInput>>,
    consequences: Option<HashMap<String, i64>>,
    requirements: Option<HashMap<String, i64>>,
}

#[derive(serde::Deserialize)]
struct DragInput {
    scene_id: u64,
    drag_index: usize,
    hover_index: usize,
    pointer_y: f32,
    row_height: f32,
}

#[derive(serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DestinationView {
    End,
    Scene { id: u64 },
}

#[derive(serde::Serialize)]
struct ChoiceView {
    id: u64,
    text: String,
    next: Option<DestinationView>,
    selectable: bool,
    unmet: Vec<UnmetView>,
    order_index: usize,
}

#[derive(serde::Serialize)]
struct UnmetView {
    stat: String,
    required: i64,
    have: i64,
}

#[derive(serde::Serialize)]
struct StatView {
    name: String,
    value: i64,
}

#[derive(serde::Serialize)]
struct SceneView {
    id: u64,
    title: String,
    content: String,
    image: Option<String>,
    audio: Option<String>,
    sound_effects: Vec<String>,
    choices: Vec<ChoiceView>,
    order_index: usize,
}

#[derive(serde::Serialize)]
struct FrameView {
    ended: bool,
    scene: Option<SceneView>,
    stats: Vec<StatView>,
}

#[derive(serde::Serialize)]
struct LintView {
    severity: String,
    message: String,
}

#[derive(serde::Serialize)]
struct WalkView {
    iterations: u32,
    completed: u32,
    stalled: u32,
    capped: u32,
    shortest_run: u32,
    longest_run: u32,
    mean_steps: f64,
    unvisited: Vec<u64>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn parse_destination(input: DestinationInput) -> Destination {
    match input {
        DestinationInput::End => Destination::End,
        DestinationInput::Scene { id } => Destination::Scene(SceneId(id)),
    }
}

fn parse_monetization(input: MonetizationInput) -> Monetization {
    match input {
        MonetizationInput::Free => Monetization::Free,
        MonetizationInput::Premium { price_cents } => Monetization::Premium { price_cents },
        MonetizationInput::SubscriberOnly => Monetization::SubscriberOnly,
    }
}

fn destination_view(destination: Destination) -> DestinationView {
    match destination {
        Destination::End => DestinationView::End,
        Destination::Scene(id) => DestinationView::Scene { id: id.0 },
    }
}

fn stat_views(stats: &Stats) -> Vec<StatView> {
    stats
        .sorted()
        .into_iter()
        .map(|(name, value)| StatView { name, value })
        .collect()
}

fn choice_view(choice: &Choice, stats: &Stats) -> ChoiceView {
    let unmet = stats
        .unmet(&choice.requirements)
        .into_iter()
        .map(|u| UnmetView {
            stat: u.stat,
            required: u.required,
            have: u.have,
        })
        .collect::<Vec<_>>();
    ChoiceView {
        id: choice.id.0,
        text: choice.text.clone(),
        next: choice.next.map(destination_view),
        selectable: unmet.is_empty(),
        unmet,
        order_index: choice.order_index,
    }
}

fn scene_view(scene: &Scene, stats: &Stats) -> SceneView {
    SceneView {
        id: scene.id.0,
        title: scene.title.clone(),
        content: scene.content.clone(),
        image: scene.image.as_ref().map(|m| m.0.clone()),
        audio: scene.audio.as_ref().map(|m| m.0.clone()),
        sound_effects: scene.sound_effects.iter().map(|m| m.0.clone()).collect(),
        choices: scene
            .ordered_choices()
            .into_iter()
            .map(|choice| choice_view(choice, stats))
            .collect(),
        order_index: scene.order_index,
    }
}

fn frame_view(frame: &Frame<'_>) -> FrameView {
    match frame {
        Frame::Scene { scene, stats, .. } => FrameView {
            ended: false,
            scene: Some(scene_view(scene, stats)),
            stats: stat_views(stats),
        },
        Frame::Ended { stats } => FrameView {
            ended: true,
            scene: None,
            stats: stat_views(stats),
        },
    }
}

// ---------------------------------------------------------------------------
// StoryStudio: the main exported struct
// ---------------------------------------------------------------------------

#[wasm_bindgen]
pub struct StoryStudio {
    session: AuthoringSession,
    preview: Option<Playthrough>,
}

#[wasm_bindgen]
impl StoryStudio {
    /// Open the studio on a brand-new story with the given title.
    #[wasm_bindgen(constructor)]
    pub fn new(title: &str) -> StoryStudio {
        StoryStudio {
            session: AuthoringSession::new(StoryMeta::titled(title)),
            preview: None,
        }
    }

    /// Replace the working story with a snapshot previously produced by
    /// `story_json` (or handed down by the platform backend). Any running
    /// preview is dropped.
    pub fn load_story(&mut self, story_json: &str) -> Result<(), JsError> {
        let story: StoryGraph = serde_json::from_str(story_json)
            .map_err(|e| JsError::new(&format!("Invalid story JSON: {e}")))?;
        self.session = AuthoringSession::from_story(story);
        self.preview = None;
        Ok(())
    }

    /// The full story graph as JSON: the snapshot the platform persists.
    pub fn story_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.session.story())
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Replace the story metadata.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "title": "The locked tower",
    ///   "category": "fantasy",
    ///   "tags": ["short", "puzzle"],
    ///   "monetization": { "kind": "premium", "price_cents": 300 }
    /// }
    /// ```
    pub fn set_meta(&mut self, meta_json: &str) -> Result<(), JsError> {
        let input: MetaInput = serde_json::from_str(meta_json)
            .map_err(|e| JsError::new(&format!("Invalid meta JSON: {e}")))?;
        self.session.set_meta(StoryMeta {
            title: input.title,
            category: input.category,
            tags: input.tags.unwrap_or_default().into_iter().collect(),
            monetization: input
                .monetization
                .map(parse_monetization)
                .unwrap_or_default(),
        });
        Ok(())
    }

    /// Create an empty scene and return its id.
    pub fn add_scene(&mut self) -> u64 {
        self.session.add_scene().0
    }

    /// Merge a field-granular patch into a scene. Unknown ids are ignored.
    ///
    /// Expected JSON shape (every field but `scene_id` optional; `null` on
    /// `image`/`audio` clears the slot):
    /// ```json
    /// { "scene_id": 3, "title": "The gate", "image": "media/gate.png" }
    /// ```
    pub fn update_scene(&mut self, patch_json: &str) -> Result<(), JsError> {
        let input: ScenePatchInput = serde_json::from_str(patch_json)
            .map_err(|e| JsError::new(&format!("Invalid scene patch JSON: {e}")))?;
        self.session.update_scene(
            SceneId(input.scene_id),
            ScenePatch {
                title: input.title,
                content: input.content,
                image: input.image.map(|m| m.map(MediaRef::new)),
                audio: input.audio.map(|m| m.map(MediaRef::new)),
                sound_effects: input
                    .sound_effects
                    .map(|fx| fx.into_iter().map(MediaRef::new).collect()),
                order_index: input.order_index,
            },
        );
        Ok(())
    }

    pub fn delete_scene(&mut self, scene_id: u64) {
        self.session.delete_scene(SceneId(scene_id));
    }

    pub fn select_scene(&mut self, scene_id: u64) {
        self.session.select_scene(SceneId(scene_id));
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    pub fn selected_scene(&self) -> Option<u64> {
        self.session.selected_scene().map(|id| id.0)
    }

    /// Append a fresh placeholder choice to a scene. Returns the new id,
    /// or `undefined` when the scene is unknown.
    pub fn add_choice(&mut self, scene_id: u64) -> Option<u64> {
        self.session.add_choice(SceneId(scene_id)).map(|id| id.0)
    }

    /// Merge a field-granular patch into a choice. A miss on either id is
    /// ignored.
    ///
    /// Expected JSON shape (`null` on `next` clears the destination back
    /// to unset):
    /// ```json
    /// {
    ///   "scene_id": 3,
    ///   "choice_id": 7,
    ///   "text": "Bribe the guard",
    ///   "next": { "kind": "scene", "id": 5 },
    ///   "consequences": { "gold": -10 },
    ///   "requirements": { "gold": 10 }
    /// }
    /// ```
    pub fn update_choice(&mut self, patch_json: &str) -> Result<(), JsError> {
        let input: ChoicePatchInput = serde_json::from_str(patch_json)
            .map_err(|e| JsError::new(&format!("Invalid choice patch JSON: {e}")))?;
        self.session.update_choice(
            SceneId(input.scene_id),
            ChoiceId(input.choice_id),
            ChoicePatch {
                text: input.text,
                next: input.next.map(|n| n.map(parse_destination)),
                consequences: input.consequences,
                requirements: input.requirements,
            },
        );
        Ok(())
    }

    pub fn delete_choice(&mut self, scene_id: u64, choice_id: u64) {
        self.session.delete_choice(SceneId(scene_id), ChoiceId(choice_id));
    }

    pub fn renumber_choices(&mut self, scene_id: u64) {
        self.session.renumber_choices(SceneId(scene_id));
    }

    /// Feed one drag-move event from the editor list through the reorder
    /// engine. Returns whether a move committed.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "scene_id": 3,
    ///   "drag_index": 0,
    ///   "hover_index": 1,
    ///   "pointer_y": 28.0,
    ///   "row_height": 40.0
    /// }
    /// ```
    pub fn drag_choice(&mut self, drag_json: &str) -> Result<bool, JsError> {
        let input: DragInput = serde_json::from_str(drag_json)
            .map_err(|e| JsError::new(&format!("Invalid drag JSON: {e}")))?;
        Ok(self.session.drag_choice(
            SceneId(input.scene_id),
            input.drag_index,
            input.hover_index,
            input.pointer_y,
            input.row_height,
        ))
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    pub fn scene_count(&self) -> usize {
        self.session.story().scene_count()
    }

    /// Run every lint check. Returns a JSON array of findings, each with a
    /// `severity` ("error" or "warning") and a human-readable `message`.
    pub fn lint_json(&self) -> Result<String, JsError> {
        let findings: Vec<LintView> = lint(self.session.story())
            .iter()
            .map(|finding| LintView {
                severity: match finding.severity() {
                    plotline::core::lint::Severity::Error => "error".to_string(),
                    plotline::core::lint::Severity::Warning => "warning".to_string(),
                },
                message: finding.to_string(),
            })
            .collect();
        serde_json::to_string(&findings)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Soak-test the story with seeded random playthroughs from the first
    /// scene. Returns a JSON report.
    pub fn walk_json(&self, iterations: u32, max_steps: u32, seed: u64) -> Result<String, JsError> {
        let story = self.session.story();
        let start = story
            .first_scene()
            .ok_or_else(|| JsError::new("Story has no scenes"))?
            .id;
        let report = random_walk(
            story,
            start,
            &WalkConfig {
                iterations,
                max_steps,
                seed,
            },
        );
        let view = WalkView {
            iterations: report.iterations,
            completed: report.completed,
            stalled: report.stalled,
            capped: report.capped,
            shortest_run: report.shortest_run,
            longest_run: report.longest_run,
            mean_steps: report.mean_steps(),
            unvisited: report.unvisited.iter().map(|id| id.0).collect(),
        };
        serde_json::to_string(&view)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Start (or restart) an in-browser preview playthrough. With no scene
    /// id the preview opens on the first scene. Returns the first frame as
    /// JSON.
    pub fn start_preview(&mut self, scene_id: Option<u64>) -> Result<String, JsError> {
        let start = match scene_id {
            Some(id) => SceneId(id),
            None => {
                self.session
                    .story()
                    .first_scene()
                    .ok_or_else(|| JsError::new("Story has no scenes"))?
                    .id
            }
        };
        self.preview = Some(Playthrough::start(start));
        self.preview_frame()
    }

    /// The current preview frame as JSON: the scene, per-choice lock
    /// state, and the stat sheet, or the ended marker.
    pub fn preview_frame(&mut self) -> Result<String, JsError> {
        let Some(run) = self.preview.as_mut() else {
            return Err(JsError::new("No preview is running"));
        };
        let frame = run.frame(self.session.story());
        serde_json::to_string(&frame_view(&frame))
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Take a choice in the running preview and return the next frame as
    /// JSON. Rejections (ended run, unknown id, unmet requirements) come
    /// back as errors and leave the preview untouched.
    pub fn preview_choose(&mut self, choice_id: u64) -> Result<String, JsError> {
        let Some(run) = self.preview.as_mut() else {
            return Err(JsError::new("No preview is running"));
        };
        run.choose(self.session.story(), ChoiceId(choice_id))
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.preview_frame()
    }

    /// Rewind the running preview to its start scene with fresh stats.
    /// Returns the first frame as JSON.
    pub fn preview_restart(&mut self) -> Result<String, JsError> {
        let Some(run) = self.preview.as_mut() else {
            return Err(JsError::new("No preview is running"));
        };
        run.restart();
        self.preview_frame()
    }

    /// Close the preview, returning the studio to pure editing.
    pub fn stop_preview(&mut self) {
        self.preview = None;
    }
}
