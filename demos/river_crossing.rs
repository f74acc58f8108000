//! River Crossing example: builds a small gated story in code and plays
//! it twice.
//!
//! The first crossing earns the ferryman's favor and takes the dry route;
//! the second skips the favor, runs into the locked choice, and wades.
//!
//! Run with: cargo run --example river_crossing

use plotline::core::playthrough::{Frame, Playthrough};
use plotline::core::session::{AuthoringSession, ChoicePatch, ScenePatch};
use plotline::schema::choice::{ChoiceId, Destination};
use plotline::schema::story::{StoryGraph, StoryMeta};
use std::collections::HashMap;

fn main() {
    // --- Build the story ---
    let mut session = AuthoringSession::new(StoryMeta::titled("The River Crossing"));

    let riverbank = session.add_scene();
    let jetty = session.add_scene();
    let far_shore = session.add_scene();

    session.update_scene(
        riverbank,
        ScenePatch {
            title: Some("The Riverbank".to_string()),
            content: Some(
                "The Aldwater runs high with spring melt. An old angler struggles \
                 with his nets by the reeds."
                    .to_string(),
            ),
            ..ScenePatch::default()
        },
    );
    session.update_scene(
        jetty,
        ScenePatch {
            title: Some("The Jetty".to_string()),
            content: Some(
                "The ferryman leans on his pole and looks you up and down.".to_string(),
            ),
            ..ScenePatch::default()
        },
    );
    session.update_scene(
        far_shore,
        ScenePatch {
            title: Some("The Far Shore".to_string()),
            content: Some("The east road climbs away from the water.".to_string()),
            ..ScenePatch::default()
        },
    );

    let help = session.add_choice(riverbank).expect("riverbank exists");
    session.update_choice(
        riverbank,
        help,
        ChoicePatch {
            text: Some("Help the angler haul his nets".to_string()),
            next: Some(Some(Destination::Scene(jetty))),
            consequences: Some(deltas(&[("favor", 1)])),
            ..ChoicePatch::default()
        },
    );

    let walk_on = session.add_choice(riverbank).expect("riverbank exists");
    session.update_choice(
        riverbank,
        walk_on,
        ChoicePatch {
            text: Some("Follow the bank downstream".to_string()),
            next: Some(Some(Destination::Scene(jetty))),
            ..ChoicePatch::default()
        },
    );

    let remind = session.add_choice(jetty).expect("jetty exists");
    session.update_choice(
        jetty,
        remind,
        ChoicePatch {
            text: Some("Remind the ferryman of your favor".to_string()),
            next: Some(Some(Destination::Scene(far_shore))),
            requirements: Some(deltas(&[("favor", 1)])),
            ..ChoicePatch::default()
        },
    );

    let wade = session.add_choice(jetty).expect("jetty exists");
    session.update_choice(
        jetty,
        wade,
        ChoicePatch {
            text: Some("Wade across the shallows".to_string()),
            next: Some(Some(Destination::Scene(far_shore))),
            consequences: Some(deltas(&[("soaked", 1)])),
            ..ChoicePatch::default()
        },
    );

    let east_road = session.add_choice(far_shore).expect("far shore exists");
    session.update_choice(
        far_shore,
        east_road,
        ChoicePatch {
            text: Some("Take the east road".to_string()),
            next: Some(Some(Destination::End)),
            ..ChoicePatch::default()
        },
    );

    let story = session.into_story();

    println!("========================================");
    println!("   THE RIVER CROSSING");
    println!("========================================");

    // --- First crossing: earn the favor, stay dry ---
    println!("\n### First crossing: the long way around\n");
    let mut run = Playthrough::start(riverbank);
    show(&mut run, &story);
    take(&mut run, &story, help);
    show(&mut run, &story);
    take(&mut run, &story, remind);
    show(&mut run, &story);
    take(&mut run, &story, east_road);
    show(&mut run, &story);

    // --- Second crossing: skip the favor, hit the lock ---
    println!("\n### Second crossing: no time for nets\n");
    run.restart();
    show(&mut run, &story);
    take(&mut run, &story, walk_on);
    show(&mut run, &story);
    take(&mut run, &story, remind); // locked: the rejection prints below
    take(&mut run, &story, wade);
    show(&mut run, &story);
    take(&mut run, &story, east_road);
    show(&mut run, &story);
}

fn deltas(entries: &[(&str, i64)]) -> HashMap<String, i64> {
    entries.iter().map(|(name, n)| (name.to_string(), *n)).collect()
}

/// Render the current frame as a little transcript block.
fn show(run: &mut Playthrough, story: &StoryGraph) {
    match run.frame(story) {
        Frame::Ended { stats } => {
            println!("--- The End ---");
            for (name, value) in stats.sorted() {
                println!("  final {}: {}", name, value);
            }
            println!();
        }
        Frame::Scene { scene, selectable, stats } => {
            println!("--- {} ---", scene.title);
            println!("{}", scene.content);
            for choice in scene.ordered_choices() {
                let marker = if selectable.contains(&choice.id) {
                    " "
                } else {
                    "x"
                };
                println!("  [{}] {}", marker, choice.text);
            }
            if !stats.is_empty() {
                let sheet: Vec<String> = stats
                    .sorted()
                    .into_iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                println!("  (stats: {})", sheet.join(", "));
            }
            println!();
        }
    }
}

fn take(run: &mut Playthrough, story: &StoryGraph, choice: ChoiceId) {
    let label = run
        .current_scene()
        .and_then(|id| story.scene(id))
        .and_then(|scene| scene.choice(choice))
        .map(|c| c.text.clone())
        .unwrap_or_else(|| format!("choice {}", choice));
    match run.choose(story, choice) {
        Ok(()) => println!("> {}", label),
        Err(e) => println!("> {} ... {}", label, e),
    }
}
