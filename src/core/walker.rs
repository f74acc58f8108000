//! Seeded random-walk soak testing for authored stories.
//!
//! The static linter cannot see runtime gating: a requirement threshold no
//! path ever satisfies only shows up when something actually plays the
//! story. The walker plays it many times over, choosing uniformly among
//! whatever is selectable, and reports how those runs went. Fixed seeds
//! keep every report reproducible.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashSet;

use crate::core::playthrough::{Frame, Playthrough};
use crate::schema::scene::SceneId;
use crate::schema::story::StoryGraph;

/// Knobs for a soak run.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// How many playthroughs to run.
    pub iterations: u32,
    /// Step cap per playthrough. Hitting it usually means the run is stuck
    /// in a cycle it keeps re-entering.
    pub max_steps: u32,
    /// Base RNG seed. Each iteration derives its own stream from it.
    pub seed: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            max_steps: 1000,
            seed: 42,
        }
    }
}

/// Aggregate outcome of a soak run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    pub iterations: u32,
    /// Runs that reached an ending.
    pub completed: u32,
    /// Runs that stopped on a scene with nothing selectable.
    pub stalled: u32,
    /// Runs that hit the step cap.
    pub capped: u32,
    /// Every scene any run visited.
    pub visited: FxHashSet<SceneId>,
    /// Scenes no run ever visited, in authoring-list order.
    pub unvisited: Vec<SceneId>,
    pub shortest_run: u32,
    pub longest_run: u32,
    pub total_steps: u64,
}

impl WalkReport {
    pub fn mean_steps(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.iterations as f64
        }
    }

    /// True when every run finished and every scene was seen.
    pub fn all_clear(&self) -> bool {
        self.completed == self.iterations && self.unvisited.is_empty()
    }
}

/// Play the story `config.iterations` times from `start`, choosing
/// uniformly at random among the selectable choices of each frame.
/// Deterministic for a given config: the same seed always yields the same
/// report.
pub fn random_walk(story: &StoryGraph, start: SceneId, config: &WalkConfig) -> WalkReport {
    let mut visited: FxHashSet<SceneId> = FxHashSet::default();
    let mut completed = 0;
    let mut stalled = 0;
    let mut capped = 0;
    let mut shortest = u32::MAX;
    let mut longest = 0;
    let mut total_steps: u64 = 0;

    for iteration in 0..config.iterations {
        // Prime-stride seeding keeps iterations independent but replayable.
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(iteration as u64 * 7919));
        let mut run = Playthrough::start(start);
        let mut steps = 0u32;

        loop {
            match run.frame(story) {
                Frame::Ended { .. } => {
                    completed += 1;
                    break;
                }
                Frame::Scene { scene, selectable, .. } => {
                    visited.insert(scene.id);
                    if steps >= config.max_steps {
                        capped += 1;
                        break;
                    }
                    let Some(&choice) = selectable.choose(&mut rng) else {
                        stalled += 1;
                        break;
                    };
                    if run.choose(story, choice).is_err() {
                        stalled += 1;
                        break;
                    }
                    steps += 1;
                }
            }
        }

        shortest = shortest.min(steps);
        longest = longest.max(steps);
        total_steps += u64::from(steps);
    }

    let unvisited: Vec<SceneId> = story
        .ordered_scenes()
        .iter()
        .map(|scene| scene.id)
        .filter(|id| !visited.contains(id))
        .collect();

    WalkReport {
        iterations: config.iterations,
        completed,
        stalled,
        capped,
        visited,
        unvisited,
        shortest_run: if config.iterations == 0 { 0 } else { shortest },
        longest_run: longest,
        total_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::choice::{Choice, ChoiceId, Destination};
    use crate::schema::scene::Scene;
    use crate::schema::story::StoryMeta;
    use std::collections::HashMap;

    fn make_choice(id: u64, next: Option<Destination>) -> Choice {
        Choice {
            id: ChoiceId(id),
            text: format!("Choice {id}"),
            next,
            consequences: HashMap::new(),
            requirements: HashMap::new(),
            order_index: 0,
        }
    }

    fn make_scene(id: u64, order_index: usize, choices: Vec<Choice>) -> Scene {
        Scene {
            id: SceneId(id),
            title: format!("Scene {id}"),
            content: String::new(),
            image: None,
            audio: None,
            sound_effects: Vec::new(),
            choices,
            order_index,
        }
    }

    fn story_of(scenes: Vec<Scene>) -> StoryGraph {
        let mut story = StoryGraph::new(StoryMeta::titled("Walk me"));
        story.scenes = scenes;
        story
    }

    /// A fork: the left branch finishes directly, the right goes through
    /// scene 3 first.
    fn forked_story() -> StoryGraph {
        story_of(vec![
            make_scene(1, 0, vec![
                make_choice(1, Some(Destination::End)),
                make_choice(2, Some(Destination::Scene(SceneId(3)))),
            ]),
            make_scene(3, 1, vec![make_choice(3, Some(Destination::End))]),
        ])
    }

    #[test]
    fn identical_seeds_produce_identical_reports() {
        let story = forked_story();
        let config = WalkConfig { iterations: 25, ..WalkConfig::default() };
        let first = random_walk(&story, SceneId(1), &config);
        let second = random_walk(&story, SceneId(1), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn enough_runs_cover_both_branches() {
        let story = forked_story();
        let config = WalkConfig { iterations: 50, ..WalkConfig::default() };
        let report = random_walk(&story, SceneId(1), &config);
        assert_eq!(report.completed, 50);
        assert!(report.visited.contains(&SceneId(3)));
        assert!(report.unvisited.is_empty());
        assert!(report.all_clear());
        assert_eq!(report.shortest_run, 1);
        assert_eq!(report.longest_run, 2);
    }

    #[test]
    fn an_endless_cycle_hits_the_step_cap() {
        let story = story_of(vec![
            make_scene(1, 0, vec![make_choice(1, Some(Destination::Scene(SceneId(2))))]),
            make_scene(2, 1, vec![make_choice(2, Some(Destination::Scene(SceneId(1))))]),
        ]);
        let config = WalkConfig { iterations: 5, max_steps: 40, ..WalkConfig::default() };
        let report = random_walk(&story, SceneId(1), &config);
        assert_eq!(report.capped, 5);
        assert_eq!(report.completed, 0);
        assert_eq!(report.longest_run, 40);
    }

    #[test]
    fn an_unsatisfiable_gate_stalls_the_run() {
        let story = story_of(vec![make_scene(1, 0, vec![Choice {
            requirements: [("gold".to_string(), 100)].into_iter().collect(),
            ..make_choice(1, Some(Destination::End))
        }])]);
        let config = WalkConfig { iterations: 3, ..WalkConfig::default() };
        let report = random_walk(&story, SceneId(1), &config);
        assert_eq!(report.stalled, 3);
        assert_eq!(report.completed, 0);
    }

    #[test]
    fn scenes_off_every_walked_path_are_reported_unvisited() {
        let mut story = forked_story();
        story.scenes.push(make_scene(9, 2, vec![make_choice(9, Some(Destination::End))]));
        let report = random_walk(&story, SceneId(1), &WalkConfig::default());
        assert_eq!(report.unvisited, vec![SceneId(9)]);
        assert!(!report.all_clear());
    }

    #[test]
    fn a_missing_start_completes_immediately() {
        let story = story_of(Vec::new());
        let config = WalkConfig { iterations: 2, ..WalkConfig::default() };
        let report = random_walk(&story, SceneId(1), &config);
        assert_eq!(report.completed, 2);
        assert_eq!(report.longest_run, 0);
        assert_eq!(report.total_steps, 0);
    }
}
