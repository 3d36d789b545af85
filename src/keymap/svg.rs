//! Decoration of keymap-drawer SVG output.
//!
//! Two visual states are layered onto the rendered SVG per repaint:
//!
//! - **learned** keys fade out (`opacity` on the key group)
//! - **held** keys light up (a `held` class backed by an injected style)
//!
//! keymap-drawer emits each key as a flat `<g class="key ...">` group
//! containing its rects and text legends; key groups do not nest, which
//! is what makes the regex approach below workable. Decoration is pure
//! string-to-string and always starts from the clean cached render.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::core::KeyLabel;

/// Opacity applied to key groups whose label is learned.
pub const LEARNED_KEY_OPACITY: f32 = 0.2;

/// Style backing the `held` class added to pressed key groups.
const HELD_STYLE: &str = "g.held rect.key { fill: #ffcc00; stroke: #ff9900; }";

/// Visual states to apply to a rendered layer.
pub struct Decorations<'a> {
    /// Keys past the mastery threshold, dimmed.
    pub learned: &'a HashSet<KeyLabel>,
    /// Keys currently held down, highlighted.
    pub held: &'a HashSet<KeyLabel>,
}

fn key_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A whole <g class="... key ..."> element, non-greedy to its </g>
        Regex::new(r#"(?s)<g\b[^>]*class="[^"]*\bkey\b[^"]*"[^>]*>.*?</g>"#)
            .expect("key group pattern should be valid regex")
    })
}

fn tap_legend_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<text\b[^>]*class="[^"]*\btap\b[^"]*"[^>]*>([^<]*)</text>"#)
            .expect("tap legend pattern should be valid regex")
    })
}

fn plain_legend_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<text\b[^>]*class="key"[^>]*>([^<]*)</text>"#)
            .expect("plain legend pattern should be valid regex")
    })
}

/// Applies learned dimming and held highlighting to a rendered layer.
pub fn decorate(svg: &str, decorations: &Decorations<'_>) -> String {
    let svg = inject_held_style(svg);

    key_group_re()
        .replace_all(&svg, |caps: &Captures<'_>| {
            let group = &caps[0];

            let Some(label) = tap_label(group) else {
                return group.to_string();
            };

            let mut decorated = group.to_string();
            if decorations.held.contains(&label) {
                decorated = add_held_class(&decorated);
            }
            if decorations.learned.contains(&label) {
                decorated = set_group_opacity(&decorated, LEARNED_KEY_OPACITY);
            }
            decorated
        })
        .into_owned()
}

/// The tap legend of a key group, normalized.
///
/// Prefers the `tap` legend; falls back to a bare `class="key"` text
/// element, matching what keymap-drawer emits for single-legend keys.
fn tap_label(group: &str) -> Option<KeyLabel> {
    let legend = tap_legend_re()
        .captures(group)
        .or_else(|| plain_legend_re().captures(group))?;

    let text = legend.get(1)?.as_str().trim();
    if text.is_empty() {
        return None;
    }
    Some(KeyLabel::new(text))
}

/// Adds a `held` class to the opening tag of a key group.
fn add_held_class(group: &str) -> String {
    match group.find(r#"class=""#) {
        Some(pos) => {
            let insert_at = pos + r#"class=""#.len();
            format!("{}held {}", &group[..insert_at], &group[insert_at..])
        }
        None => group.to_string(),
    }
}

/// Sets an opacity attribute on the opening tag of a key group.
fn set_group_opacity(group: &str, opacity: f32) -> String {
    match group.find('>') {
        Some(pos) => format!(
            r#"{} opacity="{opacity}"{}"#,
            &group[..pos],
            &group[pos..]
        ),
        None => group.to_string(),
    }
}

/// Injects the held-key style right after the opening `<svg ...>` tag.
fn inject_held_style(svg: &str) -> String {
    let Some(svg_start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let Some(tag_end) = svg[svg_start..].find('>') else {
        return svg.to_string();
    };

    let insert_at = svg_start + tag_end + 1;
    format!(
        "{}<style>{HELD_STYLE}</style>{}",
        &svg[..insert_at],
        &svg[insert_at..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A trimmed-down version of keymap-drawer output: two key groups
    /// with tap legends, one with a single plain legend.
    const SAMPLE: &str = r#"<svg width="100" height="50" viewBox="0 0 100 50">
<g transform="translate(10, 10)" class="key keypos-0">
<rect rx="6.0" ry="6.0" x="-26.0" y="-26.0" width="52.0" height="52.0" class="key side"/>
<rect rx="6.0" ry="6.0" x="-24.0" y="-24.0" width="48.0" height="48.0" class="key"/>
<text x="0" y="0" class="key tap">A</text>
</g>
<g transform="translate(64, 10)" class="key keypos-1">
<rect rx="6.0" ry="6.0" x="-24.0" y="-24.0" width="48.0" height="48.0" class="key"/>
<text x="0" y="0" class="key tap">B</text>
</g>
<g transform="translate(10, 40)" class="key keypos-2">
<rect rx="6.0" ry="6.0" x="-24.0" y="-24.0" width="48.0" height="48.0" class="key"/>
<text x="0" y="0" class="key">Shift</text>
</g>
</svg>"#;

    fn labels(labels: &[&str]) -> HashSet<KeyLabel> {
        labels.iter().map(|l| KeyLabel::new(l)).collect()
    }

    #[test]
    fn test_learned_keys_are_dimmed() {
        let learned = labels(&["a"]);
        let held = HashSet::new();

        let decorated = decorate(
            SAMPLE,
            &Decorations {
                learned: &learned,
                held: &held,
            },
        );

        let dimmed: Vec<&str> = decorated
            .lines()
            .filter(|line| line.contains(r#"opacity="0.2""#))
            .collect();
        assert_eq!(dimmed.len(), 1, "Exactly one group should be dimmed");
        assert!(dimmed[0].contains("keypos-0"), "Only 'a' is learned");
    }

    #[test]
    fn test_held_keys_get_held_class() {
        let learned = HashSet::new();
        let held = labels(&["b"]);

        let decorated = decorate(
            SAMPLE,
            &Decorations {
                learned: &learned,
                held: &held,
            },
        );

        assert!(decorated.contains(r#"class="held key keypos-1""#));
        assert!(!decorated.contains(r#"class="held key keypos-0""#));
    }

    #[test]
    fn test_held_style_is_injected_once() {
        let learned = HashSet::new();
        let held = HashSet::new();

        let decorated = decorate(
            SAMPLE,
            &Decorations {
                learned: &learned,
                held: &held,
            },
        );

        assert_eq!(decorated.matches(HELD_STYLE).count(), 1);
        // Style lands inside the svg element, right after its opening tag
        let style_pos = decorated.find("<style>").unwrap();
        let svg_tag_end = decorated.find('>').unwrap();
        assert_eq!(style_pos, svg_tag_end + 1);
    }

    #[test]
    fn test_plain_legend_fallback_matches() {
        let learned = labels(&["shift"]);
        let held = HashSet::new();

        let decorated = decorate(
            SAMPLE,
            &Decorations {
                learned: &learned,
                held: &held,
            },
        );

        let dimmed: Vec<&str> = decorated
            .lines()
            .filter(|line| line.contains("opacity"))
            .collect();
        assert_eq!(dimmed.len(), 1);
        assert!(dimmed[0].contains("keypos-2"));
    }

    #[test]
    fn test_label_match_is_case_insensitive() {
        // Legend says "A"; tracker stores lowercase labels
        let learned = labels(&["A"]);
        let held = labels(&["b"]);

        let decorated = decorate(
            SAMPLE,
            &Decorations {
                learned: &learned,
                held: &held,
            },
        );

        assert!(decorated.contains("opacity"));
        assert!(decorated.contains(r#"class="held"#));
    }

    #[test]
    fn test_undecorated_groups_are_untouched() {
        let learned = HashSet::new();
        let held = HashSet::new();

        let decorated = decorate(
            SAMPLE,
            &Decorations {
                learned: &learned,
                held: &held,
            },
        );

        assert!(!decorated.contains("opacity"));
        assert!(!decorated.contains("held key"));
    }
}
