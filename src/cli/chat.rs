use std::fs;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use rustyline::error::ReadlineError;

use crate::chat::{ChatController, MISSING_CREDENTIAL_ALERT, ModelSelector, Screen, TurnStart};
use crate::cli::commands::{self, ChatCommand, HELP, Input};
use crate::cli::editor::{self, LineEditor};
use crate::cli::key::credential_store;
use crate::core::AppConfig;
use crate::openrouter::OpenRouter;
use crate::view::{self, html, terminal};

enum Step {
    Continue,
    Quit,
}

/// Builds the controller for the configured storage, endpoint and
/// models. `model` takes precedence over `ORCHAT_DEFAULT_MODEL`.
pub fn controller(config: &AppConfig, model: Option<String>) -> Result<ChatController> {
    let initial = model.or_else(|| config.default_model.clone());
    let models = ModelSelector::new(config.models.clone(), initial.as_deref())?;
    let backend = OpenRouter::new(config.endpoint());
    Ok(ChatController::new(
        credential_store(config),
        Box::new(backend),
        models,
    ))
}

pub async fn run(config: AppConfig, model: Option<String>) -> Result<()> {
    let mut chat = controller(&config, model)?;
    let mut rl = editor::line_editor()?;
    let mut transcript = terminal::Transcript::default();

    loop {
        refresh(&mut chat, &mut transcript);
        let step = match chat.screen() {
            Screen::Setup => setup(&mut rl, &mut chat)?,
            Screen::Active => converse(&mut rl, &mut chat, &mut transcript).await?,
        };
        if let Step::Quit = step {
            break;
        }
    }

    Ok(())
}

fn refresh(chat: &mut ChatController, transcript: &mut terminal::Transcript) {
    chat.expire_status(Instant::now());
    print!("{}", transcript.update(&view::render(chat)));
    let _ = io::stdout().flush();
}

/// `None` when the user hits Ctrl-C or Ctrl-D.
fn submitted(result: rustyline::Result<String>) -> Result<Option<String>> {
    match result {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn read(rl: &mut LineEditor, prompt: &str) -> Result<Option<String>> {
    submitted(rl.readline(prompt))
}

fn alert(message: &str) {
    println!("! {}", message);
}

fn confirm(rl: &mut LineEditor, question: &str) -> bool {
    match rl.readline(&format!("{} [y/N] ", question)) {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn setup(rl: &mut LineEditor, chat: &mut ChatController) -> Result<Step> {
    let Some(line) = submitted(editor::read_masked(rl, "API key: "))? else {
        return Ok(Step::Quit);
    };
    if let Err(e) = chat.save_credential(&line) {
        alert(&e.to_string());
    }
    Ok(Step::Continue)
}

fn read_message(rl: &mut LineEditor) -> Result<Option<String>> {
    let Some(mut line) = read(rl, ">>> ")? else {
        return Ok(None);
    };

    let mut message = String::new();
    while let Some(partial) = commands::continues(&line) {
        message.push_str(partial);
        message.push('\n');
        let Some(next) = read(rl, "... ")? else {
            return Ok(None);
        };
        line = next;
    }
    message.push_str(commands::last_line(&line));

    if !message.trim().is_empty() {
        let _ = rl.add_history_entry(message.as_str());
    }
    Ok(Some(message))
}

async fn converse(
    rl: &mut LineEditor,
    chat: &mut ChatController,
    transcript: &mut terminal::Transcript,
) -> Result<Step> {
    let Some(text) = read_message(rl)? else {
        return Ok(Step::Quit);
    };

    match commands::parse(&text) {
        Input::Message(text) => match chat.begin_turn(&text) {
            TurnStart::Started(turn) => {
                // Show the message and placeholder before waiting
                refresh(chat, transcript);
                let result = chat.exchange(&turn).await;
                chat.resolve_turn(turn, result);
            }
            TurnStart::MissingCredential => alert(MISSING_CREDENTIAL_ALERT),
            TurnStart::Ignored => {}
        },
        Input::Command(command) => {
            return Ok(run_command(command, chat, |question| confirm(rl, question)));
        }
    }

    Ok(Step::Continue)
}

/// Failures are reported to the user and the session carries on.
fn run_command(
    command: ChatCommand,
    chat: &mut ChatController,
    confirm: impl FnOnce(&str) -> bool,
) -> Step {
    match command {
        ChatCommand::Model(id) => match chat.select_model(&id) {
            Ok(()) => println!("Model: {}", chat.models().selected()),
            Err(e) => alert(&e.to_string()),
        },
        ChatCommand::Models => {
            let selected = chat.models().selected();
            for model in chat.models().models() {
                let marker = if model == selected { "*" } else { " " };
                println!("{} {}", marker, model);
            }
        }
        ChatCommand::Clear => {
            chat.clear_history(confirm);
        }
        ChatCommand::ChangeKey => {
            if let Err(e) = chat.change_credential(confirm) {
                alert(&e.to_string());
            }
        }
        ChatCommand::Export(path) => match export(chat, &path) {
            Ok(()) => println!("Saved chat to {}", path),
            Err(e) => alert(&format!("Failed to save chat to {}: {}", path, e)),
        },
        ChatCommand::Redraw => {
            print!("{}", terminal::to_terminal(&view::render(chat)));
        }
        ChatCommand::Help => println!("{}", HELP),
        ChatCommand::Quit => return Step::Quit,
        ChatCommand::Unknown(name) => alert(&format!(
            "Unknown command /{}. Type /help for a list of commands.",
            name
        )),
    }
    Step::Continue
}

fn export(chat: &ChatController, path: &str) -> Result<()> {
    fs::write(path, html::to_html(&view::render(chat))?)?;
    Ok(())
}
