//! Chat widget view-model: transcript, input field, character panel,
//! drag overlay and scroll viewport. Rendering helpers never touch the
//! network.

use crate::messages::{CharacterEmotion, CharacterSummary};
use crate::scroll::Viewport;
use crate::transcript::{
    CharacterMessage, CharacterPanel, ChatMessage, Entry, EntryId, MessageKind, Sender,
    Transcript,
};

/// Local time of day, hours and minutes.
pub fn time_of_day() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    transcript: Transcript,
    input: String,
    selected_file: Option<String>,
    panel: Option<CharacterPanel>,
    overlay_active: bool,
    viewport: Viewport,
}

impl ChatWidget {
    /// Widget with a character panel and a viewport of `rows` rows.
    pub fn new(rows: f64) -> Self {
        Self {
            transcript: Transcript::new(),
            input: String::new(),
            selected_file: None,
            panel: Some(CharacterPanel::new()),
            overlay_active: false,
            viewport: Viewport::new(rows),
        }
    }

    /// Widget whose host has no character panel.
    pub fn without_panel(rows: f64) -> Self {
        Self {
            panel: None,
            ..Self::new(rows)
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn set_selected_file(&mut self, name: Option<String>) {
        self.selected_file = name;
    }

    pub fn character_panel(&self) -> Option<&CharacterPanel> {
        self.panel.as_ref()
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay_active
    }

    pub fn set_overlay(&mut self, active: bool) {
        self.overlay_active = active;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn push(&mut self, entry: Entry) -> EntryId {
        self.viewport.content_grew(entry.height());
        let id = self.transcript.push(entry);
        self.viewport.auto_scroll();
        id
    }

    pub fn append_message(&mut self, sender: Sender, text: &str, kind: MessageKind) -> EntryId {
        self.push(Entry::Message(ChatMessage {
            sender,
            text: text.to_string(),
            kind,
            timestamp: time_of_day(),
        }))
    }

    pub fn append_character_message(
        &mut self,
        character: &str,
        text: &str,
        emotion: &CharacterEmotion,
    ) -> EntryId {
        self.push(Entry::Character(CharacterMessage {
            character: character.to_string(),
            text: text.to_string(),
            emotion: emotion.clone(),
            timestamp: time_of_day(),
        }))
    }

    /// Appends a typing placeholder; the returned id is its removal handle.
    pub fn append_typing_indicator(&mut self) -> EntryId {
        self.push(Entry::Typing)
    }

    pub fn remove_typing_indicator(&mut self, id: EntryId) {
        if let Some(entry) = self.transcript.remove_typing(id) {
            self.viewport.content_shrank(entry.height());
        }
    }

    /// Rebuilds the panel from scratch; no-op when there is no panel.
    pub fn display_characters(&mut self, characters: &[CharacterSummary]) {
        if let Some(panel) = self.panel.as_mut() {
            panel.replace(characters);
        }
    }
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new(24.0)
    }
}
