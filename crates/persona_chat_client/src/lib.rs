//! Persona chat client library (`POST /chat` protocol, transcript view-model).
//! Used by the `persona-chat` terminal binary.

pub mod client;
pub mod config;
pub mod emotion;
pub mod messages;
pub mod render;
pub mod scroll;
pub mod transcript;
pub mod widget;

pub use client::{ChatClient, ClientError, DragEvent, PdfFile, RequestId};
pub use config::{default_config_path, Config, ConfigError, LoggingSection, ServerSection};
pub use emotion::emotion_emoji;
pub use messages::{CharacterEmotion, CharacterSummary, ChatResponse};
pub use transcript::{Entry, EntryId, MessageKind, Sender};
pub use widget::ChatWidget;
