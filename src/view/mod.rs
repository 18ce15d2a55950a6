//! Pure rendering of the controller state into a view description.
//! Message content is kept raw here. Each render target escapes it for
//! its own output format.

pub mod html;
pub mod terminal;

use crate::chat::{ChatController, Focus, Screen, StatusKind};
use crate::openrouter::Role;

pub const WELCOME_HEADING: &str = "Welcome!";
pub const WELCOME_TEXT: &str =
    "Start chatting with AI. Choose a model above and type your message below.";
pub const PENDING_TEXT: &str = "Thinking";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message {
        role: Role,
        avatar: &'static str,
        role_name: &'static str,
        content: String,
    },
    Pending { id: u64 },
}

impl Entry {
    pub fn message(role: Role, content: &str) -> Self {
        Entry::Message {
            role,
            avatar: avatar(role),
            role_name: role_name(role),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub entries: Vec<Entry>,
    pub welcome: bool,
    pub status: Option<StatusLine>,
    pub send_enabled: bool,
    pub focus: Focus,
    pub models: Vec<String>,
    pub selected_model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Setup {
        status: Option<StatusLine>,
        focus: Focus,
    },
    Chat(ChatView),
}

pub fn avatar(role: Role) -> &'static str {
    match role {
        Role::User => "👤",
        Role::Assistant => "🤖",
    }
}

pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "AI",
    }
}

pub fn render(chat: &ChatController) -> View {
    let status = chat.status().map(|s| StatusLine {
        kind: s.kind,
        text: s.text.clone(),
    });

    if chat.screen() == Screen::Setup {
        return View::Setup {
            status,
            focus: chat.focus(),
        };
    }

    let mut entries: Vec<Entry> = chat
        .conversation()
        .iter()
        .map(|m| Entry::message(m.role, &m.content))
        .collect();
    if let Some(id) = chat.pending_id() {
        entries.push(Entry::Pending { id });
    }

    View::Chat(ChatView {
        welcome: entries.is_empty(),
        entries,
        status,
        send_enabled: chat.send_enabled(),
        focus: chat.focus(),
        models: chat.models().models().to_vec(),
        selected_model: chat.models().selected().to_string(),
    })
}
