/// Segment builder — splits scene text into effect-tagged runs.
///
/// Offsets are UTF-16 code units, the unit story files are written in.
/// Slicing follows the forgiving rules story authors rely on: offsets past
/// the end clamp to the end, a reversed range is read back to front, and an
/// offset that falls between the halves of a surrogate pair snaps to the
/// start of that character.
use thiserror::Error;

use crate::schema::effect::{EffectKind, EffectRange};

/// A run of text sharing one effect (or none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub effect: Option<EffectKind>,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effect: None,
        }
    }

    pub fn tagged(text: impl Into<String>, effect: EffectKind) -> Self {
        Self {
            text: text.into(),
            effect: Some(effect),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Problems found by [`validate_effects`]. `index` is the position of the
/// offending range in the effect list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("effect {index}: start {start} is after end {end}")]
    Inverted { index: usize, start: usize, end: usize },
    #[error("effect {index}: end {end} is past the end of the text ({len} units)")]
    OutOfBounds { index: usize, end: usize, len: usize },
    #[error("effect {index}: starts at {start}, before the previous effect ends at {previous_end}")]
    Overlap {
        index: usize,
        start: usize,
        previous_end: usize,
    },
}

/// Partition `text` into segments according to `effects`.
///
/// Ranges are expected in ascending `start` order without overlaps; they are
/// neither sorted nor merged here. Gaps between ranges become untagged
/// segments, and a zero-length range yields an empty tagged segment.
pub fn build_segments(text: &str, effects: &[EffectRange]) -> Vec<Segment> {
    if effects.is_empty() {
        return vec![Segment::plain(text)];
    }

    let mut segments = Vec::with_capacity(effects.len() * 2 + 1);
    let mut cursor = 0;

    for effect in effects {
        if effect.start > cursor {
            segments.push(Segment::plain(substring(text, cursor, effect.start)));
        }
        segments.push(Segment::tagged(
            substring(text, effect.start, effect.end),
            effect.kind.clone(),
        ));
        cursor = effect.end;
    }

    let len = utf16_len(text);
    if cursor < len {
        segments.push(Segment::plain(substring(text, cursor, len)));
    }

    segments
}

/// Check that `effects` are in order, disjoint, and inside `text`.
///
/// [`build_segments`] never needs this; it exists so authoring tools can
/// point at ranges that would render surprisingly.
pub fn validate_effects(text: &str, effects: &[EffectRange]) -> Result<(), EffectError> {
    let len = utf16_len(text);
    let mut previous_end = 0;

    for (index, effect) in effects.iter().enumerate() {
        if effect.start > effect.end {
            return Err(EffectError::Inverted {
                index,
                start: effect.start,
                end: effect.end,
            });
        }
        if effect.end > len {
            return Err(EffectError::OutOfBounds {
                index,
                end: effect.end,
                len,
            });
        }
        if effect.start < previous_end {
            return Err(EffectError::Overlap {
                index,
                start: effect.start,
                previous_end,
            });
        }
        previous_end = effect.end;
    }

    Ok(())
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Slice `text` between two UTF-16 offsets.
fn substring(text: &str, a: usize, b: usize) -> &str {
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    let start = byte_offset(text, from);
    let end = byte_offset(text, to);
    &text[start..end]
}

/// Byte index of the character containing UTF-16 offset `units`.
fn byte_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (idx, ch) in text.char_indices() {
        if seen + ch.len_utf16() > units {
            return idx;
        }
        seen += ch.len_utf16();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn range(start: usize, end: usize, kind: EffectKind) -> EffectRange {
        EffectRange::new(start, end, kind)
    }

    fn concat(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn no_effects_yields_single_plain_segment() {
        assert_eq!(build_segments("Hello", &[]), vec![Segment::plain("Hello")]);
        assert_eq!(build_segments("", &[]), vec![Segment::plain("")]);
    }

    #[test]
    fn gaps_are_filled_with_plain_segments() {
        let segments = build_segments(
            "It moved. Behind me.",
            &[
                range(3, 8, EffectKind::Shake),
                range(10, 16, EffectKind::Small),
            ],
        );
        assert_eq!(
            segments,
            vec![
                Segment::plain("It "),
                Segment::tagged("moved", EffectKind::Shake),
                Segment::plain(". "),
                Segment::tagged("Behind", EffectKind::Small),
                Segment::plain(" me."),
            ]
        );
    }

    #[test]
    fn adjacent_ranges_have_no_gap() {
        let segments = build_segments(
            "abcdef",
            &[range(0, 3, EffectKind::Large), range(3, 6, EffectKind::Small)],
        );
        assert_eq!(
            segments,
            vec![
                Segment::tagged("abc", EffectKind::Large),
                Segment::tagged("def", EffectKind::Small),
            ]
        );
    }

    #[test]
    fn zero_length_range_is_an_empty_tagged_segment() {
        let segments = build_segments("abc", &[range(1, 1, EffectKind::Emphasis)]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("a"),
                Segment::tagged("", EffectKind::Emphasis),
                Segment::plain("bc"),
            ]
        );
    }

    #[test]
    fn ranges_past_the_end_are_clamped() {
        let segments = build_segments("short", &[range(2, 40, EffectKind::Small)]);
        assert_eq!(
            segments,
            vec![Segment::plain("sh"), Segment::tagged("ort", EffectKind::Small)]
        );

        let segments = build_segments("short", &[range(30, 39, EffectKind::Emphasis)]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("short"),
                Segment::tagged("", EffectKind::Emphasis),
            ]
        );
    }

    #[test]
    fn reversed_range_reads_back_to_front() {
        let segments = build_segments("abcdef", &[range(4, 1, EffectKind::Large)]);
        assert_eq!(segments[0], Segment::plain("abcd"));
        assert_eq!(segments[1], Segment::tagged("bcd", EffectKind::Large));
        assert_eq!(segments[2], Segment::plain("bcdef"));
    }

    #[test]
    fn offsets_count_utf16_units() {
        // Each kana is one unit; the emoji is two.
        let text = "ざわ😀ざわ";
        let segments = build_segments(text, &[range(2, 4, EffectKind::Shake)]);
        assert_eq!(
            segments,
            vec![
                Segment::plain("ざわ"),
                Segment::tagged("😀", EffectKind::Shake),
                Segment::plain("ざわ"),
            ]
        );
    }

    #[test]
    fn offset_inside_surrogate_pair_snaps_to_char_start() {
        let text = "a😀b";
        let segments = build_segments(text, &[range(0, 2, EffectKind::Large)]);
        assert_eq!(segments[0], Segment::tagged("a", EffectKind::Large));
        assert_eq!(segments[1], Segment::plain("😀b"));
        assert_eq!(concat(&segments), text);
    }

    #[test]
    fn custom_tags_pass_through() {
        let glow = EffectKind::Custom("glow".to_string());
        let segments = build_segments("xy", &[range(0, 1, glow.clone())]);
        assert_eq!(segments[0].effect, Some(glow));
        assert_eq!(segments[1].effect, None);
    }

    #[test]
    fn validate_accepts_ordered_disjoint_ranges() {
        let effects = [
            range(0, 2, EffectKind::Large),
            range(2, 4, EffectKind::Small),
            range(5, 5, EffectKind::Shake),
        ];
        assert_eq!(validate_effects("abcdef", &effects), Ok(()));
        assert_eq!(validate_effects("", &[]), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_ranges() {
        assert_eq!(
            validate_effects("abcdef", &[range(3, 2, EffectKind::Large)]),
            Err(EffectError::Inverted {
                index: 0,
                start: 3,
                end: 2
            })
        );
        assert_eq!(
            validate_effects("abc", &[range(0, 4, EffectKind::Large)]),
            Err(EffectError::OutOfBounds {
                index: 0,
                end: 4,
                len: 3
            })
        );
        assert_eq!(
            validate_effects(
                "abcdef",
                &[range(0, 4, EffectKind::Large), range(2, 5, EffectKind::Small)]
            ),
            Err(EffectError::Overlap {
                index: 1,
                start: 2,
                previous_end: 4
            })
        );
        assert!(matches!(
            validate_effects(
                "abcdef",
                &[range(4, 5, EffectKind::Large), range(0, 1, EffectKind::Small)]
            ),
            Err(EffectError::Overlap { index: 1, .. })
        ));
    }

    fn random_text(rng: &mut StdRng) -> String {
        const ALPHABET: &[char] = &['a', 'b', ' ', '\n', '。', 'ざ', '…', '😀', 'é'];
        let len = rng.gen_range(0..40);
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect()
    }

    fn random_effects(rng: &mut StdRng, len: usize) -> Vec<EffectRange> {
        let kinds = EffectKind::builtin();
        let mut effects = Vec::new();
        let mut cursor = 0;
        while cursor < len && rng.gen_bool(0.7) {
            let start = rng.gen_range(cursor..=len);
            let end = rng.gen_range(start..=len);
            let kind = kinds[rng.gen_range(0..kinds.len())].clone();
            effects.push(range(start, end, kind));
            cursor = end;
        }
        effects
    }

    #[test]
    fn concatenation_reproduces_text() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let text = random_text(&mut rng);
            let effects = random_effects(&mut rng, utf16_len(&text));
            let segments = build_segments(&text, &effects);
            assert_eq!(concat(&segments), text, "effects: {:?}", effects);
        }
    }

    #[test]
    fn tags_come_from_their_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let text = random_text(&mut rng);
            let effects = random_effects(&mut rng, utf16_len(&text));
            let segments = build_segments(&text, &effects);

            let tagged: Vec<_> = segments.iter().filter_map(|s| s.effect.clone()).collect();
            let expected: Vec<_> = effects.iter().map(|e| e.kind.clone()).collect();
            assert_eq!(tagged, expected);
        }
    }

    #[test]
    fn build_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let text = random_text(&mut rng);
            let effects = random_effects(&mut rng, utf16_len(&text));
            assert_eq!(
                build_segments(&text, &effects),
                build_segments(&text, &effects)
            );
        }
    }
}
