//! evdev keycode to key-label mapping.
//!
//! Labels must line up with what keymap-drawer prints on the keys, so
//! single characters pass through and the special keys below map to the
//! legend names the default config uses. Everything else (function keys,
//! media keys, punctuation names we have no legend for) is dropped.

use evdev::Key;

use crate::core::KeyLabel;

/// Maps an evdev key to the legend label keymap-drawer uses for it.
///
/// Returns `None` for keys that are not tracked.
pub fn label_for_key(key: Key) -> Option<KeyLabel> {
    // evdev names its constants KEY_A, KEY_LEFTSHIFT, ...
    let name = format!("{key:?}");
    let name = name.strip_prefix("KEY_")?.to_ascii_lowercase();

    let label = match name.as_str() {
        "leftshift" | "rightshift" => "Shift",
        "leftctrl" | "rightctrl" => "Control",
        "leftalt" => "Alt",
        "rightalt" => "AltGr",
        "leftmeta" | "rightmeta" => "Meta",
        "capslock" => "Caps",
        "tab" => "Tab",
        "enter" => "Enter",
        "space" => "Space",
        "backspace" => "Bckspc",
        "delete" => "Delete",
        "esc" => "Esc",
        single if single.chars().count() == 1 => single,
        _ => return None,
    };

    Some(KeyLabel::new(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits_pass_through() {
        assert_eq!(label_for_key(Key::KEY_A), Some(KeyLabel::new("a")));
        assert_eq!(label_for_key(Key::KEY_Z), Some(KeyLabel::new("z")));
        assert_eq!(label_for_key(Key::KEY_7), Some(KeyLabel::new("7")));
    }

    #[test]
    fn test_special_keys_use_legend_names() {
        assert_eq!(
            label_for_key(Key::KEY_LEFTSHIFT),
            Some(KeyLabel::new("Shift"))
        );
        assert_eq!(
            label_for_key(Key::KEY_RIGHTSHIFT),
            Some(KeyLabel::new("Shift"))
        );
        assert_eq!(
            label_for_key(Key::KEY_BACKSPACE),
            Some(KeyLabel::new("Bckspc"))
        );
        assert_eq!(label_for_key(Key::KEY_SPACE), Some(KeyLabel::new("Space")));
        assert_eq!(
            label_for_key(Key::KEY_RIGHTALT),
            Some(KeyLabel::new("AltGr"))
        );
    }

    #[test]
    fn test_backspace_label_is_a_correction_key() {
        let label = label_for_key(Key::KEY_BACKSPACE).unwrap();
        assert!(label.is_correction());
    }

    #[test]
    fn test_unmapped_multichar_names_are_dropped() {
        assert_eq!(label_for_key(Key::KEY_SEMICOLON), None);
        assert_eq!(label_for_key(Key::KEY_F5), None);
        assert_eq!(label_for_key(Key::KEY_VOLUMEUP), None);
    }

    #[test]
    fn test_non_key_codes_are_dropped() {
        // Mouse buttons print as BTN_*, not KEY_*
        assert_eq!(label_for_key(Key::BTN_LEFT), None);
    }
}
