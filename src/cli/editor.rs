//! Line editor that can hide what is typed while an API key is entered.

use std::borrow::Cow::{self, Borrowed, Owned};

use rustyline::completion::Completer;
use rustyline::config::Configurer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, Editor, Helper};

#[derive(Debug, Default)]
pub struct KeyMask {
    masking: bool,
}

impl Helper for KeyMask {}

impl Completer for KeyMask {
    type Candidate = String;
}

impl Hinter for KeyMask {
    type Hint = String;
}

impl Validator for KeyMask {}

impl Highlighter for KeyMask {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Owned(mask(line))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, kind: CmdKind) -> bool {
        match kind {
            CmdKind::MoveCursor => false,
            _ => self.masking,
        }
    }
}

pub type LineEditor = Editor<KeyMask, DefaultHistory>;

pub fn line_editor() -> rustyline::Result<LineEditor> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(KeyMask::default()));
    Ok(rl)
}

/// Reads one line showing `*` for every typed character. The line is
/// never added to history.
pub fn read_masked(rl: &mut LineEditor, prompt: &str) -> rustyline::Result<String> {
    set_masking(rl, true);
    let line = rl.readline(prompt);
    set_masking(rl, false);
    line
}

fn set_masking(rl: &mut LineEditor, masking: bool) {
    if let Some(helper) = rl.helper_mut() {
        helper.masking = masking;
    }
    // Highlighting is what hides the input
    rl.set_color_mode(if masking {
        ColorMode::Forced
    } else {
        ColorMode::Enabled
    });
}

fn mask(line: &str) -> String {
    "*".repeat(line.chars().count())
}
