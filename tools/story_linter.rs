//! Story Linter: validates a story file and optionally soak-tests it.
//!
//! Usage: story_linter <story.ron> [--walks <n>] [--max-steps <n>] [--seed <n>]

use plotline::core::lint::{by_severity, lint};
use plotline::core::walker::{random_walk, WalkConfig};
use plotline::schema::story::StoryGraph;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        process::exit(0);
    }

    let story_path = &args[1];
    let mut walks: u32 = 0;
    let mut config = WalkConfig::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--walks" if i + 1 < args.len() => {
                i += 1;
                walks = args[i].parse().unwrap_or(0);
            }
            "--max-steps" if i + 1 < args.len() => {
                i += 1;
                config.max_steps = args[i].parse().unwrap_or(config.max_steps);
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                config.seed = args[i].parse().unwrap_or(config.seed);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let source = match std::fs::read_to_string(story_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("ERROR: Failed to read '{}': {}", story_path, e);
            process::exit(1);
        }
    };
    let story: StoryGraph = match ron::from_str(&source) {
        Ok(story) => story,
        Err(e) => {
            eprintln!("ERROR: Failed to parse '{}': {}", story_path, e);
            process::exit(1);
        }
    };

    println!(
        "Loaded '{}': {} scenes, {} choices",
        story.meta.title,
        story.scene_count(),
        story.scenes.iter().map(|s| s.choices.len()).sum::<usize>()
    );

    let findings = lint(&story);
    let (errors, warnings) = by_severity(&findings);

    println!("\n=== Story Lint Report ===\n");

    if findings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if walks > 0 {
        run_walks(&story, walks, &config);
    }

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn run_walks(story: &StoryGraph, walks: u32, config: &WalkConfig) {
    let Some(first) = story.first_scene() else {
        println!("\nSkipping random walks: the story has no scenes.");
        return;
    };

    let config = WalkConfig {
        iterations: walks,
        ..config.clone()
    };
    let report = random_walk(story, first.id, &config);

    println!(
        "\n=== Random Walk: {} runs from scene {} (seed {}) ===\n",
        report.iterations, first.id, config.seed
    );
    println!("Completed: {}", report.completed);
    println!("Stalled:   {}", report.stalled);
    println!("Capped:    {} (cap {} steps)", report.capped, config.max_steps);
    println!(
        "Steps:     min {} / mean {:.1} / max {}",
        report.shortest_run,
        report.mean_steps(),
        report.longest_run
    );
    println!(
        "Coverage:  {} of {} scenes visited",
        report.visited.len(),
        story.scene_count()
    );
    if !report.unvisited.is_empty() {
        let ids: Vec<String> = report.unvisited.iter().map(|id| id.to_string()).collect();
        println!("Never visited: {}", ids.join(", "));
    }
}

fn print_usage() {
    println!("Story Linter: validates a story file and optionally soak-tests it.");
    println!();
    println!("Usage: story_linter <story.ron> [--walks <n>] [--max-steps <n>] [--seed <n>]");
    println!();
    println!("  <story.ron>      Path to a story file in RON format");
    println!("  --walks <n>      Also run n seeded random playthroughs (default: 0 = off)");
    println!("  --max-steps <n>  Step cap per playthrough (default: 1000)");
    println!("  --seed <n>       Base RNG seed for the walks (default: 42)");
}
