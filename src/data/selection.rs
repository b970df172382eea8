//! Reduce a caption mapping to a single training target.

use std::collections::BTreeMap;

use super::model::{Caption, SelectionMode, Target};

pub const IMPRESSION: &str = "impression";
pub const FINDINGS: &str = "findings";

/// Pick the target text for `caption` under `mode`.
///
/// * `Docs`: if exactly one of `impression`/`findings` holds text, that text.
///   If both do, a [`Target::Sections`] with both entries. Never random, so
///   the same index always yields the same target.
/// * `Longest`, or `Docs` with neither section present: the longest text
///   section, first one winning ties.
///
/// Returns `None` when a longest-section scan finds no text at all.
pub fn select_target(caption: &Caption, mode: SelectionMode) -> Option<Target> {
    if mode == SelectionMode::Docs {
        let impression = caption.text(IMPRESSION);
        let findings = caption.text(FINDINGS);
        match (impression, findings) {
            (Some(imp), Some(fin)) => {
                let mut both = BTreeMap::new();
                both.insert(IMPRESSION.to_string(), imp.to_string());
                both.insert(FINDINGS.to_string(), fin.to_string());
                return Some(Target::Sections(both));
            }
            (Some(one), None) | (None, Some(one)) => return Some(Target::Text(one.to_string())),
            (None, None) => {}
        }
    }

    longest_text(caption).map(|s| Target::Text(s.to_string()))
}

/// Longest text section by character count; the earliest wins a tie.
pub fn longest_text(caption: &Caption) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for text in caption.texts() {
        let len = text.chars().count();
        match best {
            Some((_, best_len)) if len <= best_len => {}
            _ => best = Some((text, len)),
        }
    }
    best.map(|(text, _)| text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SectionValue;

    fn caption(pairs: &[(&str, SectionValue)]) -> Caption {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> SectionValue {
        SectionValue::Text(s.to_string())
    }

    #[test]
    fn longest_picks_the_longest_section() {
        let c = caption(&[("impression", text("a")), ("findings", text("bbbb"))]);
        assert_eq!(
            select_target(&c, SelectionMode::Longest),
            Some(Target::Text("bbbb".into()))
        );
    }

    #[test]
    fn longest_ignores_non_text_and_keeps_first_on_tie() {
        let c = caption(&[
            ("id", SectionValue::Integer(123456789)),
            ("first", text("abc")),
            ("second", text("xyz")),
        ]);
        assert_eq!(longest_text(&c), Some("abc"));
    }

    #[test]
    fn longest_counts_characters_not_bytes() {
        let c = caption(&[("a", text("ééé")), ("b", text("abcd"))]);
        assert_eq!(longest_text(&c), Some("abcd"));
    }

    #[test]
    fn docs_with_one_section_returns_it() {
        let c = caption(&[("impression", text("x")), ("history", text("much longer text"))]);
        assert_eq!(
            select_target(&c, SelectionMode::Docs),
            Some(Target::Text("x".into()))
        );
    }

    #[test]
    fn docs_with_both_sections_is_deterministic() {
        let c = caption(&[("findings", text("f")), ("impression", text("i"))]);
        let first = select_target(&c, SelectionMode::Docs).unwrap();
        for _ in 0..10 {
            assert_eq!(select_target(&c, SelectionMode::Docs).unwrap(), first);
        }
        assert_eq!(first.section(IMPRESSION), Some("i"));
        assert_eq!(first.section(FINDINGS), Some("f"));
    }

    #[test]
    fn docs_without_sections_falls_back_to_longest() {
        let c = caption(&[("history", text("short")), ("comparison", text("longer one"))]);
        assert_eq!(
            select_target(&c, SelectionMode::Docs),
            Some(Target::Text("longer one".into()))
        );
    }

    #[test]
    fn non_text_canonical_section_counts_as_absent() {
        let c = caption(&[("impression", SectionValue::Null), ("findings", text("f"))]);
        assert_eq!(
            select_target(&c, SelectionMode::Docs),
            Some(Target::Text("f".into()))
        );
    }

    #[test]
    fn no_text_yields_none() {
        let c = caption(&[("id", SectionValue::Integer(1))]);
        assert_eq!(select_target(&c, SelectionMode::Longest), None);
        assert_eq!(select_target(&Caption::default(), SelectionMode::Docs), None);
    }
}
