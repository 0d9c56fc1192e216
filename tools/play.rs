/// Play — terminal gamebook player.
///
/// Usage: play <story.json> [--config <player.ron>] [--start <scene_id>]
///
/// Press Enter to continue, type a number and Enter to pick a choice,
/// `q` to quit. Set `RUST_LOG=gamebook_engine=debug` to trace playback.

use gamebook_engine::core::config::PlayerConfig;
use gamebook_engine::core::input::Key;
use gamebook_engine::core::player::{PlaybackState, Player};
use gamebook_engine::core::sink::RenderSink;
use gamebook_engine::schema::effect::EffectKind;
use gamebook_engine::schema::scene::Choice;
use gamebook_engine::schema::story::StoryGraph;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::thread;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const RESET: &str = "\x1b[0m";

/// Writes revealed text to stdout, styling effects with ANSI escapes.
struct TerminalSink {
    out: io::Stdout,
}

impl TerminalSink {
    fn style(effect: &EffectKind) -> &'static str {
        match effect {
            EffectKind::Large => "\x1b[1m",
            EffectKind::Small => "\x1b[2m",
            EffectKind::Shake => "\x1b[3;31m",
            EffectKind::Emphasis => "\x1b[1;4;33m",
            EffectKind::Custom(_) => "",
        }
    }
}

impl RenderSink for TerminalSink {
    fn emit_char(&mut self, ch: char, effect: Option<&EffectKind>) {
        let mut out = self.out.lock();
        let result = match effect {
            Some(effect) if ch != '\n' => write!(out, "{}{}{}", Self::style(effect), ch, RESET),
            _ => write!(out, "{}", ch),
        };
        result.and_then(|_| out.flush()).ok();
    }

    fn clear_text(&mut self) {
        print!("\x1b[2J\x1b[H");
    }

    fn show_choices(&mut self, choices: &[Choice]) {
        println!("\n");
        for (i, choice) in choices.iter().enumerate() {
            println!("  {}) {}", i + 1, choice.text);
        }
    }

    fn hide_choices(&mut self) {}

    fn show_advance_hint(&mut self) {
        println!("\n\n  [Enter]");
    }

    fn hide_advance_hint(&mut self) {}
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let story_path = args[1].clone();
    let mut config_path = None;
    let mut start_scene = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--start" if i + 1 < args.len() => {
                i += 1;
                start_scene = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let graph = StoryGraph::load_from_json(Path::new(&story_path)).unwrap_or_else(|e| {
        eprintln!("ERROR: Failed to load story '{}': {}", story_path, e);
        process::exit(1);
    });

    let mut config = match config_path {
        Some(ref path) => PlayerConfig::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("ERROR: Failed to load config '{}': {}", path, e);
            process::exit(1);
        }),
        None => PlayerConfig::default(),
    };
    if let Some(scene) = start_scene {
        config.start_scene = scene;
    }

    let mut player = Player::new(graph, config);
    let mut sink = TerminalSink { out: io::stdout() };
    let epoch = Instant::now();
    let stdin = io::stdin();

    if let Err(e) = player.restart(epoch.elapsed(), &mut sink) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }

    loop {
        while let Some(deadline) = player.next_deadline() {
            let elapsed = epoch.elapsed();
            if deadline > elapsed {
                thread::sleep(deadline - elapsed);
            }
            player.tick(epoch.elapsed(), &mut sink);
        }

        if let PlaybackState::Halted { missing } = player.state() {
            eprintln!("\nERROR: Story references missing scene '{}'", missing);
            process::exit(1);
        }

        let terminal = player.state() == &PlaybackState::Terminal;
        if terminal {
            println!("\n\n  [r] play again   [q] quit");
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();

        if line == "q" || line == "quit" {
            break;
        }

        let result = if terminal {
            if line != "r" {
                continue;
            }
            player.restart(epoch.elapsed(), &mut sink).map(|_| ())
        } else {
            player.press(key_for(line), epoch.elapsed(), &mut sink).map(|_| ())
        };
        if let Err(e) = result {
            eprintln!("ERROR: {}", e);
        }
    }

    println!("{}", RESET);
}

/// An empty line continues; a number picks a choice.
fn key_for(line: &str) -> Key {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Key::Space,
        (Some(ch), None) => Key::from_char(ch),
        _ => Key::Other,
    }
}

fn print_usage() {
    println!("Usage: play <story.json> [--config <player.ron>] [--start <scene_id>]");
}
