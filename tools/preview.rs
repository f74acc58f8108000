//! Preview: interactive playthrough shell for story files.
//!
//! Usage: preview <story.ron> [--start <scene_id>]
//!
//! Commands:
//!   look           show the current scene again
//!   choose <n>     take the n-th listed choice
//!   stats          show the stat sheet
//!   lint           run the story linter
//!   restart        start over with fresh stats
//!   help           list commands
//!   quit           exit

use plotline::core::lint::lint;
use plotline::core::playthrough::{ChoiceRejected, Frame, Playthrough};
use plotline::schema::choice::ChoiceId;
use plotline::schema::scene::SceneId;
use plotline::schema::stats::{Stats, UnmetRequirement};
use plotline::schema::story::StoryGraph;
use std::io::{self, BufRead, Write};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let story_path = &args[1];
    let mut start_override: Option<u64> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--start" if i + 1 < args.len() => {
                i += 1;
                start_override = args[i].parse().ok();
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

    let start = match start_override {
        Some(id) => SceneId(id),
        None => match story.first_scene() {
            Some(scene) => scene.id,
            None => {
                eprintln!("ERROR: '{}' has no scenes to play", story.meta.title);
                process::exit(1);
            }
        },
    };

    println!("Playing '{}' from scene {}", story.meta.title, start);
    println!("Type 'help' for commands.");

    let mut run = Playthrough::start(start);
    render(&mut run, &story);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "look" | "l" => {
                render(&mut run, &story);
            }
            "choose" | "c" => {
                if parts.len() < 2 {
                    println!("Usage: choose <n>");
                    continue;
                }
                let number: usize = match parts[1].parse() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        println!("Invalid choice number: {}", parts[1]);
                        continue;
                    }
                };
                let listed = listed_choices(&mut run, &story);
                let Some(&choice_id) = listed.get(number - 1) else {
                    println!("No choice numbered {} here.", number);
                    continue;
                };
                match run.choose(&story, choice_id) {
                    Ok(()) => render(&mut run, &story),
                    Err(ChoiceRejected::RequirementsNotMet { unmet, .. }) => {
                        println!("That choice is locked: {}", format_unmet(&unmet));
                    }
                    Err(e) => println!("Cannot choose that: {}", e),
                }
            }
            "stats" | "s" => {
                print_stats(run.stats());
            }
            "lint" => {
                let findings = lint(&story);
                if findings.is_empty() {
                    println!("No findings.");
                }
                for finding in &findings {
                    println!("  [{:?}] {}", finding.severity(), finding);
                }
            }
            "restart" | "r" => {
                run.restart();
                println!("Starting over.");
                render(&mut run, &story);
            }
            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", cmd);
            }
        }
    }
}

/// Print the current frame: scene text plus numbered choices, locked ones
/// marked with what they still need.
fn render(run: &mut Playthrough, story: &StoryGraph) {
    match run.frame(story) {
        Frame::Ended { stats } => {
            println!("\n--- The End ---");
            print_stats(&stats);
            println!("('restart' to play again)\n");
        }
        Frame::Scene { scene, selectable, stats } => {
            let heading = if scene.title.is_empty() {
                format!("Scene {}", scene.id)
            } else {
                scene.title.clone()
            };
            println!("\n=== {} ===", heading);
            if !scene.content.is_empty() {
                println!("{}", scene.content);
            }
            println!();
            for (number, choice) in scene.ordered_choices().iter().enumerate() {
                if selectable.contains(&choice.id) {
                    println!("  {}. {}", number + 1, choice.text);
                } else {
                    let unmet = stats.unmet(&choice.requirements);
                    println!(
                        "  {}. {} [locked: {}]",
                        number + 1,
                        choice.text,
                        format_unmet(&unmet)
                    );
                }
            }
            println!();
        }
    }
}

/// Choice ids in the order `render` numbers them.
fn listed_choices(run: &mut Playthrough, story: &StoryGraph) -> Vec<ChoiceId> {
    match run.frame(story) {
        Frame::Scene { scene, .. } => {
            scene.ordered_choices().iter().map(|choice| choice.id).collect()
        }
        Frame::Ended { .. } => Vec::new(),
    }
}

fn print_stats(stats: &Stats) {
    if stats.is_empty() {
        println!("No stats yet.");
        return;
    }
    for (name, value) in stats.sorted() {
        println!("  {}: {}", name, value);
    }
}

fn format_unmet(unmet: &[UnmetRequirement]) -> String {
    let parts: Vec<String> = unmet
        .iter()
        .map(|u| format!("needs {} >= {} (have {})", u.stat, u.required, u.have))
        .collect();
    parts.join(", ")
}

fn print_usage() {
    println!("Preview: interactive playthrough shell for story files.");
    println!();
    println!("Usage: preview <story.ron> [--start <scene_id>]");
    println!();
    println!("  <story.ron>        Path to a story file in RON format");
    println!("  --start <scene_id> Begin at this scene instead of the first one");
}

fn print_help() {
    println!("Commands:");
    println!("  look           Show the current scene again");
    println!("  choose <n>     Take the n-th listed choice");
    println!("  stats          Show the stat sheet");
    println!("  lint           Run the story linter");
    println!("  restart        Start over with fresh stats");
    println!("  help           Show this help");
    println!("  quit           Exit");
}
