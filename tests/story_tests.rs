/// Story format and segmentation tests against the bundled night walk story.

use gamebook_engine::core::editor::StoryEditor;
use gamebook_engine::core::segment::{build_segments, EffectError, Segment};
use gamebook_engine::schema::effect::EffectKind;
use gamebook_engine::schema::scene::Transition;
use gamebook_engine::schema::story::StoryGraph;
use std::path::Path;

fn night_walk() -> StoryGraph {
    StoryGraph::load_from_json(Path::new("story_data/night_walk/story.json")).unwrap()
}

#[test]
fn night_walk_loads_in_file_order() {
    let graph = night_walk();
    assert_eq!(graph.len(), 31);
    let keys: Vec<_> = graph.keys().take(4).collect();
    assert_eq!(keys, vec!["start", "scene1", "scene2", "choice1"]);

    match graph.get("choice1").unwrap().transition() {
        Transition::Choices(choices) => {
            assert_eq!(choices.len(), 2);
            assert_eq!(choices[0].next, "safe_route1");
            assert_eq!(choices[1].next, "dark_route1");
        }
        other => panic!("expected choices, got {:?}", other),
    }

    let endings: Vec<_> = graph
        .iter()
        .filter(|(_, scene)| scene.is_ending())
        .map(|(id, _)| id)
        .collect();
    assert_eq!(endings, vec!["safe_ending", "cat_ending", "fear_ending"]);
}

#[test]
fn file_round_trip_is_lossless() {
    let graph = night_walk();
    let original = std::fs::read("story_data/night_walk/story.json").unwrap();
    assert_eq!(graph.to_json().unwrap(), original);
    assert_eq!(StoryGraph::from_json(&original).unwrap(), graph);
}

#[test]
fn effect_offsets_are_utf16_units() {
    let graph = night_walk();

    let scene = graph.get("dark_route2").unwrap();
    let segments = build_segments(&scene.text, &scene.effects);
    assert_eq!(
        segments,
        vec![
            Segment::tagged("ざわ...ざわ...\n\n", EffectKind::Small),
            Segment::plain("木々が風に揺れる音。"),
        ]
    );

    let scene = graph.get("run_away4").unwrap();
    let segments = build_segments(&scene.text, &scene.effects);
    assert_eq!(segments[0], Segment::tagged("足音が", EffectKind::Shake));

    let scene = graph.get("fear_ending").unwrap();
    let segments = build_segments(&scene.text, &scene.effects);
    assert_eq!(segments[1], Segment::tagged("\n【 END - 暗闇の何", EffectKind::Shake));
}

#[test]
fn overlong_ranges_clamp_to_text() {
    let graph = night_walk();

    let scene = graph.get("look_back4").unwrap();
    let segments = build_segments(&scene.text, &scene.effects);
    assert_eq!(segments, vec![Segment::tagged("ガサガサッ！", EffectKind::Large)]);

    let scene = graph.get("dark_route4").unwrap();
    let segments = build_segments(&scene.text, &scene.effects);
    assert_eq!(segments.last().unwrap(), &Segment::tagged("する。", EffectKind::Shake));

    // Entirely past the end: the emphasis renders nothing.
    let scene = graph.get("run_away8").unwrap();
    let segments = build_segments(&scene.text, &scene.effects);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0], Segment::plain(scene.text.clone()));
    assert_eq!(segments[1], Segment::tagged("", EffectKind::Emphasis));
}

#[test]
fn editor_flags_overlong_ranges() {
    let editor = StoryEditor::with_graph(night_walk());
    let issues = editor.effect_issues();
    let ids: Vec<_> = issues.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "dark_route1",
            "dark_route4",
            "look_back3",
            "look_back4",
            "look_back5",
            "run_away3",
            "run_away6",
            "run_away8",
        ]
    );
    assert!(issues
        .iter()
        .all(|(_, e)| matches!(e, EffectError::OutOfBounds { .. })));
}

#[test]
fn concatenated_segments_reproduce_every_scene() {
    let graph = night_walk();
    for (id, scene) in graph.iter() {
        let segments = build_segments(&scene.text, &scene.effects);
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, scene.text, "scene {}", id);
    }
}
