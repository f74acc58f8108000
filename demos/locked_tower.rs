//! Locked Tower example: the authoring side of the engine.
//!
//! Drafts a story with the kinds of loose ends a real edit session leaves
//! behind (a dangling destination, an unwired choice, a loop with no way
//! out), reorders choices with drag events, reads the lint report, fixes
//! the findings, soak-tests the result, and saves it through a file store.
//!
//! Run with: cargo run --example locked_tower

use plotline::core::lint::lint;
use plotline::core::session::{AuthoringSession, ChoicePatch, ScenePatch};
use plotline::core::walker::{random_walk, WalkConfig};
use plotline::schema::choice::Destination;
use plotline::schema::scene::SceneId;
use plotline::schema::story::StoryMeta;
use plotline::store::FileStore;

fn main() {
    // --- Draft the tower ---
    let mut session = AuthoringSession::new(StoryMeta::titled("The Locked Tower"));

    let gatehouse = session.add_scene();
    let stair = session.add_scene();
    let guardroom = session.add_scene();

    session.update_scene(
        gatehouse,
        ScenePatch {
            title: Some("The Gatehouse".to_string()),
            content: Some("The tower door is banded iron, and locked.".to_string()),
            ..ScenePatch::default()
        },
    );
    session.update_scene(
        stair,
        ScenePatch {
            title: Some("The Spiral Stair".to_string()),
            content: Some("Steps wind upward into torchlight.".to_string()),
            ..ScenePatch::default()
        },
    );
    session.update_scene(
        guardroom,
        ScenePatch {
            title: Some("The Guardroom".to_string()),
            content: Some("A bored guard plays dice against himself.".to_string()),
            ..ScenePatch::default()
        },
    );

    // Gatehouse choices, deliberately authored in the wrong order.
    let pick_lock = session.add_choice(gatehouse).expect("gatehouse exists");
    session.update_choice(
        gatehouse,
        pick_lock,
        ChoicePatch {
            text: Some("Pick the lock".to_string()),
            next: Some(Some(Destination::Scene(stair))),
            requirements: Some([("tools".to_string(), 1)].into_iter().collect()),
            ..ChoicePatch::default()
        },
    );
    let knock = session.add_choice(gatehouse).expect("gatehouse exists");
    session.update_choice(
        gatehouse,
        knock,
        ChoicePatch {
            text: Some("Knock politely".to_string()),
            next: Some(Some(Destination::Scene(guardroom))),
            ..ChoicePatch::default()
        },
    );
    let search = session.add_choice(gatehouse).expect("gatehouse exists");
    session.update_choice(
        gatehouse,
        search,
        ChoicePatch {
            text: Some("Search the brambles for the spare key".to_string()),
            next: Some(Some(Destination::Scene(stair))),
            consequences: Some([("tools".to_string(), 1)].into_iter().collect()),
            ..ChoicePatch::default()
        },
    );

    // The stair and guardroom loop into each other; the stair also points
    // at a scene that was deleted in an earlier session.
    let climb = session.add_choice(stair).expect("stair exists");
    session.update_choice(
        stair,
        climb,
        ChoicePatch {
            text: Some("Climb to the top chamber".to_string()),
            next: Some(Some(Destination::Scene(SceneId(99)))),
            ..ChoicePatch::default()
        },
    );
    let peek = session.add_choice(stair).expect("stair exists");
    session.update_choice(
        stair,
        peek,
        ChoicePatch {
            text: Some("Peek into the guardroom".to_string()),
            next: Some(Some(Destination::Scene(guardroom))),
            ..ChoicePatch::default()
        },
    );
    let back_out = session.add_choice(guardroom).expect("guardroom exists");
    session.update_choice(
        guardroom,
        back_out,
        ChoicePatch {
            text: Some("Slip back to the stair".to_string()),
            next: Some(Some(Destination::Scene(stair))),
            ..ChoicePatch::default()
        },
    );
    // An idea for later, never wired up.
    let bribe = session.add_choice(guardroom).expect("guardroom exists");
    session.update_choice(
        guardroom,
        bribe,
        ChoicePatch {
            text: Some("Bribe the guard".to_string()),
            ..ChoicePatch::default()
        },
    );

    println!("========================================");
    println!("   THE LOCKED TOWER: AN EDIT SESSION");
    println!("========================================");

    // --- Reorder the gatehouse with drag events ---
    println!("\n### Dragging 'Search the brambles' to the top\n");
    print_choice_order(&session, gatehouse);

    // 40px rows. The first hover stays above the midpoint and does not
    // commit; the next two cross it and walk the choice up one row each.
    session.drag_choice(gatehouse, 2, 1, 25.0, 40.0);
    println!("  (hover at y=25: no move)");
    session.drag_choice(gatehouse, 2, 1, 12.0, 40.0);
    session.drag_choice(gatehouse, 1, 0, 9.0, 40.0);
    print_choice_order(&session, gatehouse);

    // --- Lint the draft ---
    println!("\n### Lint report, first pass\n");
    print_lint(&session);

    // --- Fix the findings ---
    println!("\n### Fixing: retarget the climb, wire up the bribe\n");
    session.update_choice(
        stair,
        climb,
        ChoicePatch {
            next: Some(Some(Destination::End)),
            text: Some("Climb to the top chamber and claim the tower".to_string()),
            ..ChoicePatch::default()
        },
    );
    session.update_choice(
        guardroom,
        bribe,
        ChoicePatch {
            next: Some(Some(Destination::Scene(stair))),
            consequences: Some([("coin".to_string(), -5)].into_iter().collect()),
            ..ChoicePatch::default()
        },
    );
    print_lint(&session);

    // --- Soak-test with random walks ---
    println!("\n### Soak test\n");
    let story = session.story();
    let start = story.first_scene().expect("story has scenes").id;
    let report = random_walk(story, start, &WalkConfig::default());
    println!(
        "  {} runs: {} completed, {} stalled, {} capped",
        report.iterations, report.completed, report.stalled, report.capped
    );
    println!(
        "  steps: min {} / mean {:.1} / max {}",
        report.shortest_run,
        report.mean_steps(),
        report.longest_run
    );
    if report.unvisited.is_empty() {
        println!("  every scene was visited");
    } else {
        println!("  unvisited scenes: {:?}", report.unvisited);
    }

    // --- Save and reload through the store ---
    println!("\n### Saving\n");
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = FileStore::new(dir.path());
    let id = session.save(&mut store).expect("save story");
    println!("  saved as '{}' (dirty: {})", id, session.is_dirty());

    let reopened = AuthoringSession::open(&store, &id).expect("reload story");
    println!(
        "  reloaded '{}': {} scenes, matches in-memory graph: {}",
        reopened.story().meta.title,
        reopened.story().scene_count(),
        reopened.story() == session.story()
    );
}

fn print_choice_order(session: &AuthoringSession, scene: SceneId) {
    let scene = session.story().scene(scene).expect("scene exists");
    for choice in scene.ordered_choices() {
        println!("  {}. {}", choice.order_index + 1, choice.text);
    }
}

fn print_lint(session: &AuthoringSession) {
    let findings = lint(session.story());
    if findings.is_empty() {
        println!("  all checks passed");
        return;
    }
    for finding in &findings {
        println!("  [{:?}] {}", finding.severity(), finding);
    }
}
