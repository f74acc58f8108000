//! Static story analysis: authoring diagnostics that never block anything.
//!
//! The linter does not participate in playthrough transitions; an author
//! can ignore every finding and the runtime stays exactly as permissive as
//! the editor. Reachability here ignores stat requirements on purpose: it
//! is a static over-approximation of where a player could get, and runtime
//! gating is the walker's territory.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fmt;

use crate::schema::choice::{ChoiceId, Destination};
use crate::schema::scene::SceneId;
use crate::schema::story::StoryGraph;

/// How serious a finding is. Errors almost certainly break a published
/// story; warnings are quality flags an author may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One authoring diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lint {
    /// Two scenes share an id. Only possible in hand-edited story files,
    /// and it makes every reference to the id ambiguous.
    DuplicateSceneId { scene: SceneId },
    /// Two choices within one scene share an id.
    DuplicateChoiceId { scene: SceneId, choice: ChoiceId },
    /// A choice points at a scene that does not exist. Playable (the run
    /// ends there) but almost never what the author meant.
    DanglingDestination {
        scene: SceneId,
        choice: ChoiceId,
        target: SceneId,
    },
    /// A reachable scene from which no ending can be reached: every path
    /// out of it loops forever.
    NoEndingReachable { scene: SceneId },
    /// A choice whose destination was never set. Plays as an ending, but
    /// the author probably has not finished wiring it.
    UnsetDestination { scene: SceneId, choice: ChoiceId },
    /// A choice with a blank label.
    EmptyChoiceText { scene: SceneId, choice: ChoiceId },
    /// A scene with no choices at all: a run that arrives can never leave.
    DeadEnd { scene: SceneId },
    /// A scene no chain of destinations from the first scene can reach.
    UnreachableScene { scene: SceneId },
    /// The story has no scenes, so there is nothing to play.
    EmptyStory,
}

impl Lint {
    pub fn severity(&self) -> Severity {
        match self {
            Lint::DuplicateSceneId { .. }
            | Lint::DuplicateChoiceId { .. }
            | Lint::DanglingDestination { .. }
            | Lint::NoEndingReachable { .. } => Severity::Error,
            Lint::UnsetDestination { .. }
            | Lint::EmptyChoiceText { .. }
            | Lint::DeadEnd { .. }
            | Lint::UnreachableScene { .. }
            | Lint::EmptyStory => Severity::Warning,
        }
    }
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lint::DuplicateSceneId { scene } => {
                write!(f, "scene id {scene} is used by more than one scene")
            }
            Lint::DuplicateChoiceId { scene, choice } => {
                write!(f, "scene {scene}: choice id {choice} is used more than once")
            }
            Lint::DanglingDestination { scene, choice, target } => {
                write!(f, "scene {scene}: choice {choice} points at missing scene {target}")
            }
            Lint::NoEndingReachable { scene } => {
                write!(f, "scene {scene}: no ending is reachable from here")
            }
            Lint::UnsetDestination { scene, choice } => {
                write!(f, "scene {scene}: choice {choice} has no destination yet (plays as an ending)")
            }
            Lint::EmptyChoiceText { scene, choice } => {
                write!(f, "scene {scene}: choice {choice} has empty text")
            }
            Lint::DeadEnd { scene } => {
                write!(f, "scene {scene}: no choices, a playthrough can never leave")
            }
            Lint::UnreachableScene { scene } => {
                write!(f, "scene {scene}: unreachable from the first scene")
            }
            Lint::EmptyStory => write!(f, "story has no scenes"),
        }
    }
}

/// Run every check over the story. Findings come out grouped by scene in
/// authoring order, so reports are stable run to run.
pub fn lint(story: &StoryGraph) -> Vec<Lint> {
    if story.is_empty() {
        return vec![Lint::EmptyStory];
    }
    let mut findings = Vec::new();

    let mut seen_scenes: FxHashSet<SceneId> = FxHashSet::default();
    for scene in &story.scenes {
        if !seen_scenes.insert(scene.id) {
            findings.push(Lint::DuplicateSceneId { scene: scene.id });
        }
    }

    for scene in &story.scenes {
        let mut seen_choices: FxHashSet<ChoiceId> = FxHashSet::default();
        if scene.choices.is_empty() {
            findings.push(Lint::DeadEnd { scene: scene.id });
        }
        for choice in &scene.choices {
            if !seen_choices.insert(choice.id) {
                findings.push(Lint::DuplicateChoiceId {
                    scene: scene.id,
                    choice: choice.id,
                });
            }
            if choice.text.trim().is_empty() {
                findings.push(Lint::EmptyChoiceText {
                    scene: scene.id,
                    choice: choice.id,
                });
            }
            match choice.next {
                None => findings.push(Lint::UnsetDestination {
                    scene: scene.id,
                    choice: choice.id,
                }),
                Some(Destination::Scene(target)) if story.scene(target).is_none() => {
                    findings.push(Lint::DanglingDestination {
                        scene: scene.id,
                        choice: choice.id,
                        target,
                    });
                }
                _ => {}
            }
        }
    }

    let reachable = match story.first_scene() {
        Some(first) => reachable_from(story, first.id),
        None => FxHashSet::default(),
    };
    for scene in &story.scenes {
        if !reachable.contains(&scene.id) {
            findings.push(Lint::UnreachableScene { scene: scene.id });
        }
    }

    let can_end = scenes_that_can_end(story);
    for scene in &story.scenes {
        if reachable.contains(&scene.id) && !can_end.contains(&scene.id) {
            findings.push(Lint::NoEndingReachable { scene: scene.id });
        }
    }

    findings
}

/// Split findings into (errors, warnings), preserving order.
pub fn by_severity(findings: &[Lint]) -> (Vec<&Lint>, Vec<&Lint>) {
    let errors = findings.iter().filter(|l| l.severity() == Severity::Error).collect();
    let warnings = findings.iter().filter(|l| l.severity() == Severity::Warning).collect();
    (errors, warnings)
}

/// Scenes reachable from `start` by following valid destinations.
fn reachable_from(story: &StoryGraph, start: SceneId) -> FxHashSet<SceneId> {
    let mut visited: FxHashSet<SceneId> = FxHashSet::default();
    let mut queue: VecDeque<SceneId> = VecDeque::new();
    if story.scene(start).is_some() {
        visited.insert(start);
        queue.push_back(start);
    }
    while let Some(id) = queue.pop_front() {
        let Some(scene) = story.scene(id) else { continue };
        for choice in &scene.choices {
            if let Some(Destination::Scene(target)) = choice.next {
                if story.scene(target).is_some() && visited.insert(target) {
                    queue.push_back(target);
                }
            }
        }
    }
    visited
}

/// Scenes from which some ending is reachable, found by flooding backwards
/// from every ending-capable scene.
///
/// A scene is ending-capable when one of its choices ends the run today:
/// the explicit `End` sentinel or an unset destination (the unset case is
/// already reported on its own). A dangling destination ends a run only by
/// accident, is reported as its own error, and does not count here.
fn scenes_that_can_end(story: &StoryGraph) -> FxHashSet<SceneId> {
    let mut incoming: FxHashMap<SceneId, Vec<SceneId>> = FxHashMap::default();
    let mut can_end: FxHashSet<SceneId> = FxHashSet::default();
    let mut queue: VecDeque<SceneId> = VecDeque::new();

    for scene in &story.scenes {
        for choice in &scene.choices {
            if let Some(Destination::Scene(target)) = choice.next {
                if story.scene(target).is_some() {
                    incoming.entry(target).or_default().push(scene.id);
                }
            }
        }
        if scene.choices.iter().any(|choice| choice.is_ending()) && can_end.insert(scene.id) {
            queue.push_back(scene.id);
        }
    }

    while let Some(id) = queue.pop_front() {
        if let Some(sources) = incoming.get(&id) {
            for &source in sources {
                if can_end.insert(source) {
                    queue.push_back(source);
                }
            }
        }
    }
    can_end
}
