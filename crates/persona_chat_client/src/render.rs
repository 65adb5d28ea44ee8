//! Plain-text rendering of transcript entries and the character panel.

use crate::emotion::emotion_tag;
use crate::transcript::{
    CharacterPanel, Entry, MessageKind, Sender, CHARACTER_PANEL_HEADING, TYPING_TEXT,
};

pub fn render_entry(entry: &Entry) -> String {
    match entry {
        Entry::Message(m) => {
            let who = match m.sender {
                Sender::User => "you",
                Sender::Bot => "bot",
            };
            let label = match m.kind {
                MessageKind::Plain => who.to_string(),
                kind => format!("{} [{}]", who, kind.as_str()),
            };
            format!("[{}] {}: {}", m.timestamp, label, m.text)
        }
        Entry::Character(c) => format!(
            "[{}] {} ({})\n{}",
            c.timestamp,
            c.character,
            emotion_tag(&c.emotion.emotion),
            c.text
        ),
        Entry::Typing => format!("{}...", TYPING_TEXT),
    }
}

pub fn render_panel(panel: &CharacterPanel) -> String {
    let mut out = String::from(CHARACTER_PANEL_HEADING);
    for card in panel.cards() {
        out.push_str(&format!("\n  {}\n    {}", card.name, card.summary));
    }
    out
}
