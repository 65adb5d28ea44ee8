//! Transcript model: append-only bubbles plus the character panel.

use crate::messages::{CharacterEmotion, CharacterSummary};

/// Who a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Styling variant of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageKind {
    #[default]
    Plain,
    Error,
    Info,
}

impl MessageKind {
    /// Extra style class; empty for plain bubbles.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Plain => "",
            MessageKind::Error => "error",
            MessageKind::Info => "info",
        }
    }
}

/// Stable identifier for one transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub kind: MessageKind,
    pub timestamp: String,
}

/// A bot bubble attributed to a persona.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterMessage {
    pub character: String,
    pub text: String,
    pub emotion: CharacterEmotion,
    pub timestamp: String,
}

/// Placeholder shown while a chat reply is pending.
pub const TYPING_TEXT: &str = "Bot is typing";

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Message(ChatMessage),
    Character(CharacterMessage),
    Typing,
}

impl Entry {
    /// Rows the entry occupies in a transcript viewport.
    pub fn height(&self) -> f64 {
        let rows = match self {
            Entry::Message(m) => text_rows(&m.text) + 1,
            Entry::Character(c) => text_rows(&c.text) + 2,
            Entry::Typing => 1,
        };
        rows as f64
    }
}

fn text_rows(text: &str) -> usize {
    text.lines().count().max(1)
}

/// Ordered list of entries. Only typing indicators can be removed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<(EntryId, Entry)>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, entry));
        id
    }

    /// Removes the typing indicator with `id`. Returns the removed entry,
    /// or `None` when `id` is unknown or not a typing indicator.
    pub fn remove_typing(&mut self, id: EntryId) -> Option<Entry> {
        let pos = self
            .entries
            .iter()
            .position(|(eid, e)| *eid == id && matches!(e, Entry::Typing))?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// Entries appended after `id` (all entries when `None`).
    pub fn since(&self, id: Option<EntryId>) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.iter().filter(move |(eid, _)| id.map_or(true, |last| *eid > last))
    }

    pub fn last_id(&self) -> Option<EntryId> {
        self.entries.last().map(|(id, _)| *id)
    }

    pub fn typing_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, e)| matches!(e, Entry::Typing))
            .count()
    }

    /// Bubbles only, typing indicators skipped.
    pub fn messages(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .map(|(_, e)| e)
            .filter(|e| !matches!(e, Entry::Typing))
    }
}

/// Heading rendered above the character cards.
pub const CHARACTER_PANEL_HEADING: &str = "Available Characters";

/// Side listing of personas, rebuilt wholesale from each upload result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPanel {
    cards: Vec<CharacterSummary>,
    revision: u64,
}

impl CharacterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, characters: &[CharacterSummary]) {
        self.cards = characters.to_vec();
        self.revision += 1;
    }

    pub fn cards(&self) -> &[CharacterSummary] {
        &self.cards
    }

    /// Bumped on every rebuild, even when the cards are unchanged.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
