//! The playthrough simulator: deterministic replay of a story graph as a
//! sequence of player-visible frames.
//!
//! A playthrough owns only its own cursor and stat sheet; the graph is
//! borrowed per call, read-only, so one graph can back any number of
//! concurrent runs. Cycles in the graph are legal, which means a run only
//! ends when it takes an ending choice or lands on a scene that no longer
//! exists.

use thiserror::Error;

use crate::schema::choice::{ChoiceId, Destination};
use crate::schema::scene::{Scene, SceneId};
use crate::schema::stats::{Stats, UnmetRequirement};
use crate::schema::story::StoryGraph;

/// Why a [`choose`](Playthrough::choose) call was refused. A rejected
/// choice applies no consequences and moves nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceRejected {
    /// The playthrough is over; no further transitions exist.
    #[error("the playthrough has already ended")]
    Ended,
    /// The id does not belong to the current scene. Gating is scene-scoped:
    /// a choice that exists elsewhere in the story is still unknown here.
    #[error("choice {0} is not part of the current scene")]
    UnknownChoice(ChoiceId),
    /// One or more stat requirements do not hold yet.
    #[error("choice {choice} is locked by {} unmet requirement(s)", .unmet.len())]
    RequirementsNotMet {
        choice: ChoiceId,
        unmet: Vec<UnmetRequirement>,
    },
}

/// Where the cursor sits between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    At(SceneId),
    Ended,
}

/// One render step's worth of player-visible state.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<'a> {
    /// A live scene: what to show, which choices may currently be taken,
    /// and a snapshot of the stat sheet. Locked choices stay visible in
    /// `scene.choices`; they are simply absent from `selectable`.
    Scene {
        scene: &'a Scene,
        selectable: Vec<ChoiceId>,
        stats: Stats,
    },
    /// Terminal state, carrying the run's final stats.
    Ended { stats: Stats },
}

impl Frame<'_> {
    pub fn is_ended(&self) -> bool {
        matches!(self, Frame::Ended { .. })
    }

    pub fn stats(&self) -> &Stats {
        match self {
            Frame::Scene { stats, .. } | Frame::Ended { stats } => stats,
        }
    }
}

/// A single run through a story graph.
#[derive(Debug, Clone)]
pub struct Playthrough {
    start: SceneId,
    cursor: Cursor,
    stats: Stats,
}

impl Playthrough {
    /// Begin at the given scene with an empty stat sheet. The id is not
    /// checked here: a missing start resolves to an ended frame on the
    /// first render, the same lazy rule as any other dangling reference.
    pub fn start(start: SceneId) -> Self {
        Self {
            start,
            cursor: Cursor::At(start),
            stats: Stats::new(),
        }
    }

    /// The render step. Resolves the cursor against the graph: a missing
    /// scene ends the run here rather than erroring, which is what makes
    /// dangling destinations legal to author.
    pub fn frame<'s>(&mut self, story: &'s StoryGraph) -> Frame<'s> {
        match self.cursor {
            Cursor::Ended => Frame::Ended {
                stats: self.stats.clone(),
            },
            Cursor::At(id) => match story.scene(id) {
                Some(scene) => Frame::Scene {
                    scene,
                    selectable: self.selectable(scene),
                    stats: self.stats.clone(),
                },
                None => {
                    self.cursor = Cursor::Ended;
                    Frame::Ended {
                        stats: self.stats.clone(),
                    }
                }
            },
        }
    }

    /// Ids of the scene's choices whose requirements all currently hold,
    /// in list order. Choices with no requirements always qualify.
    fn selectable(&self, scene: &Scene) -> Vec<ChoiceId> {
        scene
            .choices
            .iter()
            .filter(|choice| self.stats.meets(&choice.requirements))
            .map(|choice| choice.id)
            .collect()
    }

    /// Take a choice from the current scene.
    ///
    /// Requirements are re-checked here instead of trusting whatever gate
    /// the caller rendered: a call that bypassed the visible lock gets a
    /// typed rejection and no consequences are applied. On success the
    /// consequences land and the cursor advances, ending the run for an
    /// `End` or unset destination.
    pub fn choose(&mut self, story: &StoryGraph, choice_id: ChoiceId) -> Result<(), ChoiceRejected> {
        let scene_id = match self.cursor {
            Cursor::Ended => return Err(ChoiceRejected::Ended),
            Cursor::At(id) => id,
        };
        let Some(scene) = story.scene(scene_id) else {
            // The scene vanished since the last frame. Same lazy rule as
            // the render step: the run is over, not broken.
            self.cursor = Cursor::Ended;
            return Err(ChoiceRejected::Ended);
        };
        let Some(choice) = scene.choice(choice_id) else {
            return Err(ChoiceRejected::UnknownChoice(choice_id));
        };
        let unmet = self.stats.unmet(&choice.requirements);
        if !unmet.is_empty() {
            return Err(ChoiceRejected::RequirementsNotMet {
                choice: choice_id,
                unmet,
            });
        }

        self.stats.apply(&choice.consequences);
        self.cursor = match choice.next {
            None | Some(Destination::End) => Cursor::Ended,
            Some(Destination::Scene(next)) => Cursor::At(next),
        };
        Ok(())
    }

    /// Throw away all progress and return to the start scene.
    pub fn restart(&mut self) {
        self.cursor = Cursor::At(self.start);
        self.stats = Stats::new();
    }

    pub fn start_scene(&self) -> SceneId {
        self.start
    }

    /// The scene the cursor points at, `None` once the run has ended.
    pub fn current_scene(&self) -> Option<SceneId> {
        match self.cursor {
            Cursor::At(id) => Some(id),
            Cursor::Ended => None,
        }
    }

    pub fn has_ended(&self) -> bool {
        self.cursor == Cursor::Ended
    }

    /// The stat sheet accumulated so far (the final outcome once ended).
    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}
