//! Plain text rendering for the interactive terminal.
//!
//! Terminals interpret control characters the way browsers interpret
//! tags, so message content is stripped of them before printing.

use super::{
    ChatView, Entry, PENDING_TEXT, StatusLine, View, WELCOME_HEADING, WELCOME_TEXT, avatar,
    role_name,
};
use crate::chat::Focus;
use crate::openrouter::Role;

/// Removes control characters other than newline and tab.
pub fn escape(content: &str) -> String {
    content
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn message_text(avatar: &str, role_name: &str, content: &str) -> String {
    format!("{} {}\n{}\n\n", avatar, role_name, escape(content))
}

fn pending_text() -> String {
    format!(
        "{} {}\n{}...\n\n",
        avatar(Role::Assistant),
        role_name(Role::Assistant),
        PENDING_TEXT
    )
}

fn welcome_text() -> String {
    format!("{}\n{}\n\n", WELCOME_HEADING, WELCOME_TEXT)
}

fn status_text(status: &StatusLine) -> String {
    format!("[{}]\n", escape(&status.text))
}

fn entry_text(entry: &Entry) -> String {
    match entry {
        Entry::Message {
            avatar,
            role_name,
            content,
            ..
        } => message_text(avatar, role_name, content),
        Entry::Pending { .. } => pending_text(),
    }
}

/// Full transcript of a view.
pub fn to_terminal(view: &View) -> String {
    match view {
        View::Setup { status, .. } => {
            let mut out = String::from("Enter your OpenRouter API key (starts with sk-or-v1-)\n");
            if let Some(status) = status {
                out += &status_text(status);
            }
            out
        }
        View::Chat(chat) => {
            let mut out = format!("Model: {}\n\n", chat.selected_model);
            if chat.welcome {
                out += &welcome_text();
            }
            for entry in chat.entries.iter() {
                out += &entry_text(entry);
            }
            if let Some(status) = &chat.status {
                out += &status_text(status);
            }
            out
        }
    }
}

/// Tracks what has already been printed so each render only writes
/// what changed since the terminal is append-only.
#[derive(Debug, Default)]
pub struct Transcript {
    shown: usize,
    pending_shown: Option<u64>,
    welcomed: bool,
    in_setup: bool,
    last_status: Option<String>,
}

impl Transcript {
    /// Returns the text to print to bring the terminal up to date with
    /// `view`.
    pub fn update(&mut self, view: &View) -> String {
        let mut out = String::new();
        match view {
            View::Setup { status, .. } => {
                if !self.in_setup {
                    *self = Transcript {
                        in_setup: true,
                        ..Default::default()
                    };
                    out += &to_terminal(&View::Setup {
                        status: None,
                        focus: Focus::CredentialInput,
                    });
                }
                out += &self.update_status(status);
            }
            View::Chat(chat) => {
                out += &self.update_chat(chat);
                out += &self.update_status(&chat.status);
            }
        }
        out
    }

    fn update_chat(&mut self, chat: &ChatView) -> String {
        let mut out = String::new();
        let messages: Vec<&Entry> = chat
            .entries
            .iter()
            .filter(|e| matches!(e, Entry::Message { .. }))
            .collect();

        // Coming back from setup or the history was cleared
        if self.in_setup || messages.len() < self.shown {
            *self = Transcript::default();
        }

        if chat.welcome && !self.welcomed {
            out += &welcome_text();
            self.welcomed = true;
        }

        for entry in messages.iter().skip(self.shown) {
            out += &entry_text(entry);
        }
        self.shown = messages.len();

        let pending = chat.entries.iter().find_map(|e| match e {
            Entry::Pending { id } => Some(*id),
            _ => None,
        });
        if pending.is_some() && pending != self.pending_shown {
            out += &pending_text();
        }
        self.pending_shown = pending;

        out
    }

    fn update_status(&mut self, status: &Option<StatusLine>) -> String {
        let text = status.as_ref().map(|s| s.text.clone());
        if text == self.last_status {
            return String::new();
        }
        self.last_status = text;
        status.as_ref().map(status_text).unwrap_or_default()
    }
}
