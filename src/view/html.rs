//! HTML rendering of a view using Handlebars. Every `{{value}}` is
//! HTML escaped by Handlebars so message content can never turn into
//! markup. Nothing here uses triple-stash.

use std::fmt;

use anyhow::{Error, Result};
use handlebars::Handlebars;
use serde_json::{Value, json};

use super::{
    ChatView, Entry, PENDING_TEXT, StatusLine, View, WELCOME_HEADING, WELCOME_TEXT, avatar,
    role_name,
};
use crate::chat::{Focus, StatusKind};
use crate::openrouter::Role;

#[derive(Debug)]
pub enum Template {
    SetupPage,
    ChatPage,
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const SETUP_PAGE: &str = r#"<div id="api-key-setup">
    <h2>Enter your OpenRouter API key</h2>
    <input id="api-key-input" type="password" placeholder="sk-or-v1-..."{{#if focused}} autofocus{{/if}}>
    <button id="save-key-btn">Save</button>
    <div id="status" class="{{status_kind}}">{{status}}</div>
</div>
"#;

const CHAT_PAGE: &str = r#"<div id="chat-interface">
    <select id="model-select">
{{#each models}}
        <option value="{{id}}"{{#if selected}} selected{{/if}}>{{id}}</option>
{{/each}}
    </select>
    <button id="clear-btn">Clear</button>
    <button id="change-key-btn">Change API key</button>
    <div id="chat-container">
{{#if welcome}}
        <div class="welcome-message">
            <h2>{{welcome_heading}}</h2>
            <p>{{welcome_text}}</p>
        </div>
{{/if}}
{{#each entries}}
{{#if pending}}
        <div class="message assistant loading" id="loading-{{id}}">
            <div class="message-avatar">{{avatar}}</div>
            <div class="message-content">
                <div class="message-role">{{role_name}}</div>
                <div class="message-text">
                    <span>{{content}}</span>
                    <div class="loading-dots"><span></span><span></span><span></span></div>
                </div>
            </div>
        </div>
{{else}}
        <div class="message {{role}}">
            <div class="message-avatar">{{avatar}}</div>
            <div class="message-content">
                <div class="message-role">{{role_name}}</div>
                <div class="message-text">{{content}}</div>
            </div>
        </div>
{{/if}}
{{/each}}
    </div>
    <textarea id="user-input"{{#if focused}} autofocus{{/if}}></textarea>
    <button id="send-btn"{{#unless send_enabled}} disabled{{/unless}}>Send</button>
    <div id="status" class="{{status_kind}}">{{status}}</div>
</div>
"#;

pub fn templates<'a>() -> Result<Handlebars<'a>, Error> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_template_string(&Template::SetupPage.to_string(), SETUP_PAGE)?;
    registry.register_template_string(&Template::ChatPage.to_string(), CHAT_PAGE)?;
    Ok(registry)
}

fn status_kind(status: &Option<StatusLine>) -> &'static str {
    match status.as_ref().map(|s| s.kind) {
        Some(StatusKind::Progress) => "progress",
        Some(StatusKind::Success) => "success",
        Some(StatusKind::Error) => "error",
        None => "",
    }
}

fn status_text(status: &Option<StatusLine>) -> &str {
    status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
}

fn entry_context(entry: &Entry) -> Value {
    match entry {
        Entry::Message {
            role,
            avatar,
            role_name,
            content,
        } => json!({
            "pending": false,
            "id": Value::Null,
            "role": match role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            "avatar": avatar,
            "role_name": role_name,
            "content": content,
        }),
        Entry::Pending { id } => json!({
            "pending": true,
            "id": id,
            "role": "assistant",
            "avatar": avatar(Role::Assistant),
            "role_name": role_name(Role::Assistant),
            "content": PENDING_TEXT,
        }),
    }
}

fn chat_context(view: &ChatView) -> Value {
    let models: Vec<Value> = view
        .models
        .iter()
        .map(|id| json!({"id": id, "selected": *id == view.selected_model}))
        .collect();
    let entries: Vec<Value> = view.entries.iter().map(entry_context).collect();

    json!({
        "models": models,
        "welcome": view.welcome,
        "welcome_heading": WELCOME_HEADING,
        "welcome_text": WELCOME_TEXT,
        "entries": entries,
        "focused": view.focus == Focus::Composer,
        "send_enabled": view.send_enabled,
        "status": status_text(&view.status),
        "status_kind": status_kind(&view.status),
    })
}

/// Renders the view as the chat page markup.
pub fn to_html(view: &View) -> Result<String, Error> {
    let registry = templates()?;
    let html = match view {
        View::Setup { status, focus } => registry.render(
            &Template::SetupPage.to_string(),
            &json!({
                "focused": *focus == Focus::CredentialInput,
                "status": status_text(status),
                "status_kind": status_kind(status),
            }),
        )?,
        View::Chat(chat) => registry.render(&Template::ChatPage.to_string(), &chat_context(chat))?,
    };
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_view(entries: Vec<Entry>) -> View {
        View::Chat(ChatView {
            welcome: entries.is_empty(),
            entries,
            status: None,
            send_enabled: true,
            focus: Focus::Composer,
            models: vec![String::from("openrouter/auto"), String::from("openai/gpt-4o-mini")],
            selected_model: String::from("openai/gpt-4o-mini"),
        })
    }

    #[test]
    fn it_escapes_message_content() {
        let view = chat_view(vec![Entry::message(
            Role::User,
            "<script>alert('x')</script> & <b>bold</b>",
        )]);

        let html = to_html(&view).unwrap();

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp;"));
    }

    #[test]
    fn it_renders_the_welcome_message_when_empty() {
        let html = to_html(&chat_view(vec![])).unwrap();
        assert!(html.contains("welcome-message"));
        assert!(html.contains(WELCOME_HEADING));
    }

    #[test]
    fn it_renders_bubbles_and_pending_placeholder() {
        let html = to_html(&chat_view(vec![
            Entry::message(Role::User, "Hello"),
            Entry::Pending { id: 42 },
        ]))
        .unwrap();

        assert!(!html.contains("welcome-message"));
        assert!(html.contains(r#"<div class="message user">"#));
        assert!(html.contains(r#"<div class="message-role">You</div>"#));
        assert!(html.contains(r#"id="loading-42""#));
        assert!(html.contains("Thinking"));
        assert!(html.contains(r#"<option value="openai/gpt-4o-mini" selected>"#));
    }

    #[test]
    fn it_disables_send_while_pending() {
        let View::Chat(mut chat) = chat_view(vec![Entry::Pending { id: 1 }]) else {
            unreachable!()
        };
        chat.send_enabled = false;
        let html = to_html(&View::Chat(chat)).unwrap();
        assert!(html.contains(r#"<button id="send-btn" disabled>"#));
    }

    #[test]
    fn it_renders_setup() {
        let html = to_html(&View::Setup {
            status: None,
            focus: Focus::CredentialInput,
        })
        .unwrap();
        assert!(html.contains(r#"id="api-key-input""#));
        assert!(html.contains("autofocus"));
    }
}
