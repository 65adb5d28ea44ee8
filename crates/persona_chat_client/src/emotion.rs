//! Emotion label → emoji decoration for character replies.

/// Shown for any label outside the table, including the empty label.
pub const NEUTRAL_EMOJI: &str = "😐";

const EMOTION_EMOJIS: [(&str, &str); 6] = [
    ("happy", "😊"),
    ("sad", "😢"),
    ("angry", "😠"),
    ("surprised", "😲"),
    ("fearful", "😨"),
    ("disgusted", "🤢"),
];

/// Case-insensitive lookup; never fails.
pub fn emotion_emoji(label: &str) -> &'static str {
    EMOTION_EMOJIS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(NEUTRAL_EMOJI)
}

/// `"<emoji> <label>"`, the tag shown next to a character's name.
pub fn emotion_tag(label: &str) -> String {
    format!("{} {}", emotion_emoji(label), label)
}
