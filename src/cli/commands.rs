//! Slash commands typed into the composer

pub const HELP: &str = r"Commands:
  /model <id>      Select the model used for the next message
  /models          List the configured models
  /clear           Clear all messages
  /key             Change the API key (clears the chat)
  /export <path>   Write the chat as HTML to <path>
  /redraw          Print the whole chat again
  /help            Show this help
  /quit            Exit

End a line with \ to continue the message on the next line.
End it with \\ to send a single literal \ instead.
Start a message with // to send a literal leading slash.";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Message(String),
    Command(ChatCommand),
}

#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Model(String),
    Models,
    Clear,
    ChangeKey,
    Export(String),
    Redraw,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse(line: &str) -> Input {
    let trimmed = line.trim_start();
    if let Some(literal) = trimmed.strip_prefix("//") {
        return Input::Message(format!("/{}", literal));
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim_end(), ""),
    };

    let command = match (name, arg) {
        ("model", id) if !id.is_empty() => ChatCommand::Model(id.to_string()),
        ("models", _) => ChatCommand::Models,
        ("clear", _) => ChatCommand::Clear,
        ("key", _) => ChatCommand::ChangeKey,
        ("export", path) if !path.is_empty() => ChatCommand::Export(path.to_string()),
        ("redraw", _) => ChatCommand::Redraw,
        ("help", _) => ChatCommand::Help,
        ("quit", _) | ("exit", _) => ChatCommand::Quit,
        _ => ChatCommand::Unknown(name.to_string()),
    };
    Input::Command(command)
}

/// Returns the line without its trailing `\` when the message goes on
/// to the next line. A doubled `\\` is not a continuation.
pub fn continues(line: &str) -> Option<&str> {
    if line.ends_with("\\\\") {
        return None;
    }
    line.strip_suffix('\\')
}

/// Unescapes the line that ends a message: a trailing `\\` becomes a
/// single `\`.
pub fn last_line(line: &str) -> &str {
    match line.strip_suffix("\\\\") {
        Some(rest) => &line[..rest.len() + 1],
        None => line,
    }
}
