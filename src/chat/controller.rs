use std::time::Instant;

use crate::chat::selector::{ModelError, ModelSelector};
use crate::chat::status::Status;
use crate::credential::{Credential, CredentialError, CredentialStore};
use crate::openrouter::{BoxedBackend, CompletionError, Message, Role};

pub const SAVED_CREDENTIAL_STATUS: &str = "API key saved securely!";
pub const THINKING_STATUS: &str = "AI is thinking...";
pub const SENT_STATUS: &str = "Message sent!";
pub const CLEAR_HISTORY_QUESTION: &str = "Clear all messages?";
pub const CHANGE_CREDENTIAL_QUESTION: &str = "Change API key? This will clear your chat history.";
pub const MISSING_CREDENTIAL_ALERT: &str = "No API key found. Please set up your API key first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    CredentialInput,
    Composer,
}

/// Everything needed to run the request for a turn that has started.
/// `messages` is a snapshot of the conversation at submission time.
#[derive(Debug)]
pub struct PendingTurn {
    pub id: u64,
    pub model: String,
    pub api_key: Credential,
    pub messages: Vec<Message>,
}

#[derive(Debug)]
pub enum TurnStart {
    Started(PendingTurn),
    /// Blank input or a turn is already pending
    Ignored,
    /// The key vanished from storage. The controller is back in setup.
    MissingCredential,
}

#[derive(Debug)]
pub enum SendOutcome {
    Ignored,
    MissingCredential,
    Replied,
    Failed(CompletionError),
}

/// Text of the assistant message shown in place of a reply when a
/// turn fails.
pub fn failure_message(description: &str) -> String {
    format!(
        "❌ Error: {}\n\nPlease check:\n- Your API key is correct\n- You have credits in your account\n- Your internet connection",
        description
    )
}

/// Owns the conversation and drives one request per user turn.
///
/// Starts in `Screen::Active` when a credential is already stored,
/// otherwise in `Screen::Setup`. `send` borrows the controller mutably
/// across the request so there is never more than one turn in flight.
pub struct ChatController {
    credentials: CredentialStore,
    backend: BoxedBackend,
    models: ModelSelector,
    conversation: Vec<Message>,
    pending: Option<u64>,
    next_pending_id: u64,
    status: Option<Status>,
    send_enabled: bool,
    focus: Focus,
    screen: Screen,
}

impl ChatController {
    pub fn new(credentials: CredentialStore, backend: BoxedBackend, models: ModelSelector) -> Self {
        let (screen, focus) = match credentials.get() {
            Some(_) => (Screen::Active, Focus::Composer),
            None => (Screen::Setup, Focus::CredentialInput),
        };
        Self {
            credentials,
            backend,
            models,
            conversation: Vec::new(),
            pending: None,
            next_pending_id: 1,
            status: None,
            send_enabled: true,
            focus,
            screen,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    pub fn pending_id(&self) -> Option<u64> {
        self.pending
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn send_enabled(&self) -> bool {
        self.send_enabled
    }

    pub fn models(&self) -> &ModelSelector {
        &self.models
    }

    pub fn select_model(&mut self, id: &str) -> Result<(), ModelError> {
        self.models.select(id)
    }

    /// Drops the status if it was a transient one that has run its
    /// course.
    pub fn expire_status(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| s.is_expired(now)) {
            self.status = None;
        }
    }

    pub fn save_credential(&mut self, candidate: &str) -> Result<(), CredentialError> {
        self.credentials.set(candidate)?;
        self.screen = Screen::Active;
        self.focus = Focus::Composer;
        self.status = Some(Status::success(SAVED_CREDENTIAL_STATUS));
        Ok(())
    }

    /// Clears the credential and the conversation and goes back to
    /// setup if `confirm` agrees. Returns whether anything happened.
    pub fn change_credential(
        &mut self,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<bool, CredentialError> {
        if !confirm(CHANGE_CREDENTIAL_QUESTION) {
            return Ok(false);
        }
        self.credentials.clear()?;
        self.reset_conversation();
        self.status = None;
        self.enter_setup();
        Ok(true)
    }

    /// Discards the conversation if `confirm` agrees. The credential is
    /// left alone.
    pub fn clear_history(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(CLEAR_HISTORY_QUESTION) {
            return false;
        }
        self.reset_conversation();
        self.status = None;
        true
    }

    /// Moves from idle to pending for a non-blank submission. The user
    /// message is part of the conversation before this returns.
    pub fn begin_turn(&mut self, text: &str) -> TurnStart {
        let text = text.trim();
        if text.is_empty() || self.pending.is_some() || self.screen != Screen::Active {
            return TurnStart::Ignored;
        }

        let Some(api_key) = self.credentials.get() else {
            tracing::warn!("No credential found when sending a message");
            self.enter_setup();
            return TurnStart::MissingCredential;
        };

        self.conversation.push(Message::new(Role::User, text));

        let id = self.next_pending_id;
        self.next_pending_id += 1;
        self.pending = Some(id);
        self.send_enabled = false;
        self.status = Some(Status::progress(THINKING_STATUS));

        TurnStart::Started(PendingTurn {
            id,
            model: self.models.selected().to_string(),
            api_key,
            messages: self.conversation.clone(),
        })
    }

    /// Runs the request for a started turn.
    pub async fn exchange(&self, turn: &PendingTurn) -> Result<String, CompletionError> {
        self.backend
            .complete(&turn.messages, turn.api_key.as_str(), &turn.model)
            .await
    }

    /// Settles a pending turn with the result of its request and returns
    /// to idle. A turn that is no longer pending, because history was
    /// cleared in the meantime, is dropped.
    pub fn resolve_turn(
        &mut self,
        turn: PendingTurn,
        result: Result<String, CompletionError>,
    ) -> SendOutcome {
        if self.pending != Some(turn.id) {
            tracing::debug!("Dropping result for turn {} that is no longer pending", turn.id);
            return SendOutcome::Ignored;
        }
        self.pending = None;

        let outcome = match result {
            Ok(reply) => {
                self.conversation.push(Message::new(Role::Assistant, &reply));
                self.status = Some(Status::success(SENT_STATUS));
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::error!("Completion failed: {}", e);
                let description = e.to_string();
                self.conversation
                    .push(Message::new(Role::Assistant, &failure_message(&description)));
                self.status = Some(Status::error(&format!("Error: {}", description)));
                SendOutcome::Failed(e)
            }
        };

        self.send_enabled = true;
        self.focus = Focus::Composer;
        outcome
    }

    /// Runs a whole turn: submit, wait for the one request, settle.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let turn = match self.begin_turn(text) {
            TurnStart::Started(turn) => turn,
            TurnStart::Ignored => return SendOutcome::Ignored,
            TurnStart::MissingCredential => return SendOutcome::MissingCredential,
        };
        let result = self.exchange(&turn).await;
        self.resolve_turn(turn, result)
    }

    fn reset_conversation(&mut self) {
        self.conversation.clear();
        self.pending = None;
        self.send_enabled = true;
        self.focus = Focus::Composer;
    }

    fn enter_setup(&mut self) {
        self.screen = Screen::Setup;
        self.focus = Focus::CredentialInput;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use super::*;
    use crate::credential::MemoryStorage;
    use crate::openrouter::CompletionBackend;

    /// Replies with canned results and records every request it sees
    struct ScriptedBackend {
        replies: Mutex<Vec<Result<String, CompletionError>>>,
        requests: Arc<Mutex<Vec<(Vec<Message>, String)>>>,
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            messages: &[Message],
            _api_key: &str,
            model: &str,
        ) -> Result<String, CompletionError> {
            self.requests
                .lock()
                .unwrap()
                .push((messages.to_vec(), model.to_string()));
            self.replies.lock().unwrap().remove(0)
        }
    }

    type Requests = Arc<Mutex<Vec<(Vec<Message>, String)>>>;

    fn controller(
        key: Option<&str>,
        replies: Vec<Result<String, CompletionError>>,
    ) -> (ChatController, Requests) {
        let mut credentials = CredentialStore::new(MemoryStorage::default());
        if let Some(key) = key {
            credentials.set(key).unwrap();
        }
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));
        let backend = ScriptedBackend {
            replies: Mutex::new(replies),
            requests: Arc::clone(&requests),
        };
        let models = ModelSelector::new(
            vec![String::from("openai/gpt-4o-mini"), String::from("openrouter/auto")],
            None,
        )
        .unwrap();
        (
            ChatController::new(credentials, Box::new(backend), models),
            requests,
        )
    }

    #[test]
    fn it_starts_in_setup_without_a_credential() {
        let (chat, _) = controller(None, vec![]);
        assert_eq!(chat.screen(), Screen::Setup);
        assert_eq!(chat.focus(), Focus::CredentialInput);
    }

    #[test]
    fn it_enters_chat_after_saving_a_credential() {
        let (mut chat, _) = controller(None, vec![]);

        assert!(matches!(
            chat.save_credential("nope"),
            Err(CredentialError::InvalidFormat)
        ));
        assert_eq!(chat.screen(), Screen::Setup);

        chat.save_credential("sk-or-v1-abc123").unwrap();
        assert_eq!(chat.screen(), Screen::Active);
        assert_eq!(chat.focus(), Focus::Composer);
        assert_eq!(chat.status().unwrap().text, SAVED_CREDENTIAL_STATUS);
    }

    #[test]
    fn it_ignores_blank_submissions() {
        let (mut chat, _) = controller(Some("sk-or-v1-abc123"), vec![]);
        assert!(matches!(chat.begin_turn("  \n "), TurnStart::Ignored));
        assert!(chat.conversation().is_empty());
        assert!(chat.send_enabled());
    }

    #[test]
    fn it_marks_the_turn_pending() {
        let (mut chat, _) = controller(Some("sk-or-v1-abc123"), vec![]);

        let TurnStart::Started(turn) = chat.begin_turn("  Hello ") else {
            panic!("Turn did not start");
        };

        assert_eq!(chat.conversation(), &[Message::new(Role::User, "Hello")]);
        assert_eq!(turn.messages, chat.conversation());
        assert_eq!(turn.model, "openai/gpt-4o-mini");
        assert_eq!(chat.pending_id(), Some(turn.id));
        assert!(!chat.send_enabled());
        assert_eq!(chat.status().unwrap().text, THINKING_STATUS);

        // A second submission can't start while one is pending
        assert!(matches!(chat.begin_turn("Again"), TurnStart::Ignored));
        assert_eq!(chat.conversation().len(), 1);
    }

    #[tokio::test]
    async fn it_appends_the_reply() {
        let (mut chat, requests) = controller(
            Some("sk-or-v1-abc123"),
            vec![Ok(String::from("Hi there")), Ok(String::from("Bye"))],
        );

        assert!(matches!(chat.send("Hello").await, SendOutcome::Replied));
        chat.select_model("openrouter/auto").unwrap();
        assert!(matches!(chat.send("Later").await, SendOutcome::Replied));

        assert_eq!(
            chat.conversation(),
            &[
                Message::new(Role::User, "Hello"),
                Message::new(Role::Assistant, "Hi there"),
                Message::new(Role::User, "Later"),
                Message::new(Role::Assistant, "Bye"),
            ]
        );
        assert_eq!(chat.pending_id(), None);
        assert!(chat.send_enabled());
        assert_eq!(chat.status().unwrap().text, SENT_STATUS);

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].0, vec![Message::new(Role::User, "Hello")]);
        assert_eq!(requests[0].1, "openai/gpt-4o-mini");
        assert_eq!(requests[1].0.len(), 3);
        assert_eq!(requests[1].1, "openrouter/auto");
    }

    #[tokio::test]
    async fn it_appends_a_synthetic_error() {
        let (mut chat, _) = controller(
            Some("sk-or-v1-abc123"),
            vec![Err(CompletionError::EndpointError {
                status: StatusCode::PAYMENT_REQUIRED,
                message: String::from("insufficient credit"),
            })],
        );

        assert!(matches!(chat.send("Hello").await, SendOutcome::Failed(_)));

        let last = chat.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, failure_message("insufficient credit"));
        assert!(last.content.contains("You have credits in your account"));
        assert_eq!(chat.status().unwrap().text, "Error: insufficient credit");
        assert!(chat.send_enabled());
        assert_eq!(chat.focus(), Focus::Composer);

        // Errors don't clear themselves
        chat.expire_status(Instant::now() + Duration::from_secs(10));
        assert!(chat.status().is_some());
    }

    #[tokio::test]
    async fn it_expires_the_sent_status() {
        let (mut chat, _) = controller(Some("sk-or-v1-abc123"), vec![Ok(String::from("Hi"))]);
        chat.send("Hello").await;

        let set_at = chat.status().unwrap().set_at;
        chat.expire_status(set_at + Duration::from_secs(1));
        assert!(chat.status().is_some());
        chat.expire_status(set_at + Duration::from_secs(3));
        assert!(chat.status().is_none());
    }

    #[test]
    fn it_drops_a_turn_cleared_while_pending() {
        let (mut chat, _) = controller(Some("sk-or-v1-abc123"), vec![]);
        let TurnStart::Started(turn) = chat.begin_turn("Hello") else {
            panic!("Turn did not start");
        };

        assert!(chat.clear_history(|_| true));
        assert!(chat.send_enabled());

        let outcome = chat.resolve_turn(turn, Ok(String::from("Hi there")));
        assert!(matches!(outcome, SendOutcome::Ignored));
        assert!(chat.conversation().is_empty());
    }

    #[tokio::test]
    async fn it_only_clears_history_when_confirmed() {
        let (mut chat, _) = controller(Some("sk-or-v1-abc123"), vec![Ok(String::from("Hi"))]);
        chat.send("Hello").await;

        let mut asked = String::new();
        assert!(!chat.clear_history(|q| {
            asked = q.to_string();
            false
        }));
        assert_eq!(asked, CLEAR_HISTORY_QUESTION);
        assert_eq!(chat.conversation().len(), 2);

        assert!(chat.clear_history(|_| true));
        assert!(chat.conversation().is_empty());
        assert!(chat.status().is_none());
        assert_eq!(chat.screen(), Screen::Active);
    }

    #[tokio::test]
    async fn it_changes_the_credential() {
        let (mut chat, _) = controller(Some("sk-or-v1-abc123"), vec![Ok(String::from("Hi"))]);
        chat.send("Hello").await;

        assert!(!chat.change_credential(|_| false).unwrap());
        assert_eq!(chat.screen(), Screen::Active);

        assert!(chat.change_credential(|q| q == CHANGE_CREDENTIAL_QUESTION).unwrap());
        assert_eq!(chat.screen(), Screen::Setup);
        assert_eq!(chat.focus(), Focus::CredentialInput);
        assert!(chat.conversation().is_empty());

        // Nothing can be sent until a new key is saved
        assert!(matches!(chat.send("Hello").await, SendOutcome::Ignored));
    }

    #[tokio::test]
    async fn it_drops_the_error_status_when_changing_the_credential() {
        let (mut chat, _) = controller(
            Some("sk-or-v1-abc123"),
            vec![Err(CompletionError::RequestFailed(String::from(
                "connection refused",
            )))],
        );
        chat.send("Hello").await;
        assert_eq!(chat.status().unwrap().text, "Error: connection refused");

        assert!(chat.change_credential(|_| true).unwrap());
        assert!(chat.status().is_none());
    }
}
