#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{Shell, Step};
use core_config::Settings;
use core_events::{Event, KeyCode, KeyModifiers};
use core_model::ScreenLayout;
use core_state::{EditorState, SharedContext};
use core_text::Position;

pub fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

pub fn shell_with(settings: Settings, text: &[&str]) -> Shell {
    let mut shell = Shell::new(SharedContext::new(settings), ScreenLayout::new(40, 10));
    shell.open_text(&lines(text).join("\n"));
    shell
}

pub fn shell(text: &[&str]) -> Shell {
    shell_with(Settings::default(), text)
}

pub fn state(shell: &Shell) -> &EditorState {
    &shell.active().state
}

pub fn buffer(shell: &Shell) -> Vec<String> {
    state(shell).buffer.lines().to_vec()
}

pub fn cursor(shell: &Shell) -> Position {
    state(shell).cursor
}

pub fn place(shell: &mut Shell, line: usize, col: usize) {
    shell.active_mut().state.cursor = Position::new(line, col);
}

pub fn send(shell: &mut Shell, event: Event) -> Step {
    shell.handle_event(&event)
}

pub fn key(shell: &mut Shell, code: KeyCode) -> Step {
    send(shell, Event::key(code))
}

pub fn shifted(shell: &mut Shell, code: KeyCode) -> Step {
    send(shell, Event::key_with(code, KeyModifiers::SHIFT))
}

pub fn ctrl(shell: &mut Shell, c: char) -> Step {
    send(shell, Event::ctrl(c))
}

pub fn type_str(shell: &mut Shell, text: &str) {
    for c in text.chars() {
        send(shell, Event::char(c));
    }
}

/// Type `text` into the open prompt and submit it.
pub fn answer_prompt(shell: &mut Shell, text: &str) -> Step {
    type_str(shell, text);
    key(shell, KeyCode::Enter)
}
