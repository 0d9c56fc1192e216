/// Playback integration tests — full runs through the night walk story.

use gamebook_engine::core::config::PlayerConfig;
use gamebook_engine::core::input::{Key, Signal};
use gamebook_engine::core::player::{Handled, PlaybackState, Player, PlayerError};
use gamebook_engine::core::sink::{RecordingSink, SinkEvent};
use gamebook_engine::schema::scene::Scene;
use gamebook_engine::schema::story::StoryGraph;
use std::path::Path;
use std::time::Duration;

fn night_walk_player() -> Player {
    let graph =
        StoryGraph::load_from_json(Path::new("story_data/night_walk/story.json")).unwrap();
    let config =
        PlayerConfig::load_from_ron(Path::new("story_data/night_walk/player.ron")).unwrap();
    Player::new(graph, config)
}

/// Tick at each deadline until the current scene stops revealing.
fn settle(player: &mut Player, sink: &mut RecordingSink, now: &mut Duration) {
    while let Some(deadline) = player.next_deadline() {
        *now = deadline;
        player.tick(*now, sink);
    }
    assert_ne!(player.state(), &PlaybackState::Revealing);
}

#[test]
fn cat_ending_walkthrough() {
    let mut player = night_walk_player();
    let mut sink = RecordingSink::new();
    let mut now = Duration::ZERO;

    player.restart(now, &mut sink).unwrap();
    for expected in ["scene1", "scene2", "choice1"] {
        settle(&mut player, &mut sink, &mut now);
        assert_eq!(player.state(), &PlaybackState::AwaitingAdvance);
        let handled = player.press(Key::Space, now, &mut sink).unwrap();
        assert_eq!(handled, Handled::Entered(expected.to_string()));
    }

    settle(&mut player, &mut sink, &mut now);
    assert_eq!(player.state(), &PlaybackState::AwaitingChoice);
    assert_eq!(player.current_choices().len(), 2);
    assert!(matches!(
        sink.events().last(),
        Some(SinkEvent::ShowChoices { choices }) if choices.len() == 2
    ));
    player.press(Key::Digit(2), now, &mut sink).unwrap();
    assert_eq!(player.current_scene(), Some("dark_route1"));

    for _ in 0..3 {
        settle(&mut player, &mut sink, &mut now);
        player.press(Key::Tap, now, &mut sink).unwrap();
    }
    settle(&mut player, &mut sink, &mut now);
    player.press(Key::Space, now, &mut sink).unwrap();
    assert_eq!(player.current_scene(), Some("choice2"));

    settle(&mut player, &mut sink, &mut now);
    player.signal(Signal::Choose(0), now, &mut sink).unwrap();
    assert_eq!(player.current_scene(), Some("look_back1"));

    while player.state() != &PlaybackState::Terminal {
        settle(&mut player, &mut sink, &mut now);
        if player.state() == &PlaybackState::AwaitingAdvance {
            player.press(Key::Space, now, &mut sink).unwrap();
        }
    }

    assert_eq!(player.current_scene(), Some("cat_ending"));
    let scene = player.graph().get("cat_ending").unwrap();
    assert_eq!(sink.visible_text(), scene.text);
    assert!(player.current_choices().is_empty());
}

#[test]
fn effect_tags_reach_the_sink() {
    let mut player = night_walk_player();
    let mut sink = RecordingSink::new();
    let mut now = Duration::ZERO;

    player.start("dark_route2", now, &mut sink).unwrap();
    settle(&mut player, &mut sink, &mut now);

    let chars: Vec<(char, Option<String>)> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            SinkEvent::Char { ch, effect } => Some((*ch, effect.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(chars.len(), "ざわ...ざわ...\n\n木々が風に揺れる音。".chars().count());
    assert!(chars[..12].iter().all(|(_, e)| e.as_deref() == Some("small")));
    assert!(chars[12..].iter().all(|(_, e)| e.is_none()));
}

#[test]
fn reveal_timing_skips_newlines() {
    let mut graph = StoryGraph::new();
    graph.put("start", Scene::new("ab\ncd"));
    let mut player = Player::new(graph, PlayerConfig::default());
    let mut sink = RecordingSink::new();
    let mut now = Duration::ZERO;

    player.start("start", now, &mut sink).unwrap();
    settle(&mut player, &mut sink, &mut now);
    assert_eq!(now, Duration::from_millis(150));
    assert_eq!(player.state(), &PlaybackState::Terminal);
}

#[test]
fn number_keys_do_not_leak_into_later_scenes() {
    let mut player = night_walk_player();
    let mut sink = RecordingSink::new();
    let mut now = Duration::ZERO;

    player.start("choice1", now, &mut sink).unwrap();
    settle(&mut player, &mut sink, &mut now);
    player.press(Key::Digit(1), now, &mut sink).unwrap();
    assert_eq!(player.current_scene(), Some("safe_route1"));

    settle(&mut player, &mut sink, &mut now);
    assert_eq!(player.state(), &PlaybackState::AwaitingAdvance);
    assert_eq!(
        player.press(Key::Digit(2), now, &mut sink),
        Ok(Handled::Ignored)
    );
    assert_eq!(player.current_scene(), Some("safe_route1"));
}

#[test]
fn jumping_scenes_mid_reveal_leaves_no_stale_output() {
    let mut player = night_walk_player();
    let mut sink = RecordingSink::new();

    player.start("scene1", Duration::ZERO, &mut sink).unwrap();
    player.tick(Duration::from_millis(275), &mut sink);
    assert_eq!(player.state(), &PlaybackState::Revealing);

    let mut now = Duration::from_millis(280);
    player.start("look_back2", now, &mut sink).unwrap();
    sink.drain();
    settle(&mut player, &mut sink, &mut now);

    let scene = player.graph().get("look_back2").unwrap();
    let emitted: String = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            SinkEvent::Char { ch, .. } => Some(*ch),
            _ => None,
        })
        .collect();
    // The first character was emitted inside `start`, before the drain.
    assert_eq!(emitted, scene.text.chars().skip(1).collect::<String>());
}

#[test]
fn dangling_choice_target_halts_playback() {
    let mut graph = StoryGraph::new();
    graph.put(
        "start",
        Scene::new("?").with_choices(vec![
            gamebook_engine::schema::scene::Choice::new("Into the void", "void"),
        ]),
    );
    let mut player = Player::new(graph, PlayerConfig::default());
    let mut sink = RecordingSink::new();

    player.start("start", Duration::ZERO, &mut sink).unwrap();
    let before = sink.events().len();
    let result = player.signal(Signal::Choose(0), Duration::from_millis(10), &mut sink);
    assert_eq!(result, Err(PlayerError::UnknownScene("void".to_string())));
    assert_eq!(sink.events().len(), before);
    assert!(player.state().is_finished());
}
