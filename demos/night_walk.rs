/// Night Walk example — plays the bundled story headlessly.
///
/// Follows the dark road, looks back, and reaches the cat ending. Playback
/// runs against a recording sink on a simulated clock, so the whole story
/// finishes instantly; each scene is printed once its text is fully
/// revealed, with effect spans marked like `<shake>...</shake>`.
///
/// Run with: cargo run --example night_walk

use gamebook_engine::core::config::PlayerConfig;
use gamebook_engine::core::input::{Key, Signal};
use gamebook_engine::core::player::{PlaybackState, Player};
use gamebook_engine::core::sink::{RecordingSink, SinkEvent};
use gamebook_engine::schema::story::StoryGraph;
use std::path::Path;
use std::time::Duration;

fn main() {
    // --- Load story and player settings ---
    let graph = StoryGraph::load_from_json(Path::new("story_data/night_walk/story.json"))
        .expect("Failed to load night walk story");
    let config = PlayerConfig::load_from_ron(Path::new("story_data/night_walk/player.ron"))
        .expect("Failed to load player config");
    let delay = config.type_delay();

    let mut player = Player::new(graph, config);
    let mut sink = RecordingSink::new();
    let mut now = Duration::ZERO;

    println!("========================================");
    println!("   NIGHT WALK");
    println!("========================================");
    println!();

    // Choice picks along the route: dark road first, then look back.
    let mut picks = [1usize, 0].into_iter();

    player
        .restart(now, &mut sink)
        .expect("Story has no start scene");

    loop {
        while let Some(deadline) = player.next_deadline() {
            now = deadline;
            player.tick(now, &mut sink);
        }

        let scene = player.current_scene().unwrap_or("?").to_string();
        print_scene(&scene, &sink.drain());

        let signal = match player.state() {
            PlaybackState::AwaitingAdvance => Signal::Advance,
            PlaybackState::AwaitingChoice => {
                let pick = picks.next().unwrap_or(0);
                println!("   > {}", player.current_choices()[pick].text);
                println!();
                Signal::Choose(pick)
            }
            PlaybackState::Halted { missing } => {
                println!("   [halted: missing scene '{}']", missing);
                break;
            }
            _ => break,
        };

        // A stray digit while text is on screen does nothing.
        player.press(Key::Digit(9), now, &mut sink).ok();
        player
            .signal(signal, now, &mut sink)
            .expect("Story references a missing scene");
    }

    println!("========================================");
    println!(
        "   Finished at {:.1}s simulated ({}ms per character)",
        now.as_secs_f64(),
        delay.as_millis()
    );
    println!("========================================");
}

/// Print one scene's revealed text, wrapping effect runs in tags.
fn print_scene(id: &str, events: &[SinkEvent]) {
    let mut text = String::new();
    let mut open: Option<String> = None;

    for event in events {
        if let SinkEvent::Char { ch, effect } = event {
            if *effect != open {
                if let Some(ref tag) = open {
                    text.push_str(&format!("</{}>", tag));
                }
                if let Some(ref tag) = effect {
                    text.push_str(&format!("<{}>", tag));
                }
                open = effect.clone();
            }
            text.push(*ch);
        }
    }
    if let Some(tag) = open {
        text.push_str(&format!("</{}>", tag));
    }

    println!("--- {} ---", id);
    for line in text.lines() {
        println!("   {}", line);
    }
    println!();
}
