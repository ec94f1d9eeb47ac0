mod common;

use common::*;
use core_actions::{Shell, Step};
use core_config::Settings;
use core_events::{Event, KeyCode};
use core_model::{ExitOutcome, ScreenLayout};
use core_state::{Mode, PromptKind, SharedContext};
use core_text::Position;
use pretty_assertions::assert_eq;
use std::fs;

fn continue_step() -> Step {
    Step::Continue { repaint_all: false }
}

#[test]
fn save_as_then_plain_save_write_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    let mut sh = shell(&["one", "two"]);
    ctrl(&mut sh, 's');
    assert_eq!(state(&sh).mode, Mode::Prompt(PromptKind::SaveAs));
    answer_prompt(&mut sh, path.to_str().unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    assert_eq!(state(&sh).message(), Some("Saved 2 lines, 8 bytes"));
    assert!(!state(&sh).modified);

    type_str(&mut sh, "x");
    assert!(state(&sh).modified);
    ctrl(&mut sh, 's');
    assert_eq!(fs::read_to_string(&path).unwrap(), "xone\ntwo\n");
    assert!(!state(&sh).modified);
}

#[test]
fn failed_save_reports_path_and_keeps_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("f.txt");
    let mut sh = shell(&["keep"]);
    ctrl(&mut sh, 'a');
    answer_prompt(&mut sh, path.to_str().unwrap());
    let msg = state(&sh).message().unwrap().to_string();
    assert!(msg.starts_with(path.to_str().unwrap()), "{msg}");
    assert_eq!(buffer(&sh), lines(&["keep"]));
    assert_eq!(state(&sh).mode, Mode::Normal);
}

#[test]
fn opening_missing_file_starts_named_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.txt");
    let mut sh = Shell::new(SharedContext::new(Settings::default()), ScreenLayout::new(40, 10));
    sh.open_path(&path);
    assert_eq!(state(&sh).message(), Some("New file"));
    assert_eq!(buffer(&sh), lines(&[""]));
    assert_eq!(ctrl(&mut sh, 'q'), Step::Exit(ExitOutcome::FileName(path)));
}

#[test]
fn loaded_tabs_are_written_back_as_tabs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabs.txt");
    fs::write(&path, "\tx\n").unwrap();
    let mut sh = Shell::new(SharedContext::new(Settings::default()), ScreenLayout::new(40, 10));
    sh.open_path(&path);
    assert_eq!(buffer(&sh), lines(&["        x"]));
    assert!(state(&sh).write_tabs);
    ctrl(&mut sh, 's');
    assert_eq!(fs::read_to_string(&path).unwrap(), "\tx\n");
}

#[test]
fn unnamed_buffer_exits_with_its_content() {
    let mut sh = shell(&["a", "b"]);
    assert_eq!(
        ctrl(&mut sh, 'q'),
        Step::Exit(ExitOutcome::Content("a\nb".to_string()))
    );
}

#[test]
fn modified_quit_asks_first() {
    let mut sh = shell(&["a"]);
    type_str(&mut sh, "z");
    assert_eq!(ctrl(&mut sh, 'q'), continue_step());
    assert_eq!(state(&sh).mode, Mode::Prompt(PromptKind::ConfirmQuit));
    type_str(&mut sh, "n");
    assert_eq!(state(&sh).mode, Mode::Normal);
    ctrl(&mut sh, 'q');
    assert!(matches!(send(&mut sh, Event::char('y')), Step::Exit(_)));
}

#[test]
fn confirm_quit_save_needs_a_name() {
    let mut sh = shell(&["a"]);
    type_str(&mut sh, "z");
    ctrl(&mut sh, 'q');
    assert_eq!(send(&mut sh, Event::char('s')), continue_step());
    assert_eq!(state(&sh).message(), Some("No file name"));
}

#[test]
fn open_prompt_adds_session_and_next_buffer_cycles() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let mut sh = shell(&["first"]);
    ctrl(&mut sh, 'o');
    let step = answer_prompt(&mut sh, dir.path().to_str().unwrap());
    assert_eq!(step, Step::Continue { repaint_all: true });
    assert_eq!(sh.workspace.len(), 2);
    assert_eq!(buffer(&sh), lines(&["../", "b.txt", "sub/"]));
    assert!(state(&sh).file_name.is_none());

    ctrl(&mut sh, 't');
    assert_eq!(sh.workspace.active_index(), 0);
    assert_eq!(buffer(&sh), lines(&["first"]));

    // Closing one of two sessions keeps the editor running.
    assert_eq!(ctrl(&mut sh, 'q'), Step::Continue { repaint_all: true });
    assert_eq!(sh.workspace.len(), 1);
}

#[test]
fn goto_prompt_moves_or_reports() {
    let mut sh = shell(&["a", "b", "c"]);
    ctrl(&mut sh, 'g');
    answer_prompt(&mut sh, "2");
    assert_eq!(cursor(&sh), Position::new(1, 0));
    ctrl(&mut sh, 'g');
    answer_prompt(&mut sh, "99");
    assert_eq!(cursor(&sh), Position::new(2, 0));
    ctrl(&mut sh, 'g');
    answer_prompt(&mut sh, "x");
    assert_eq!(state(&sh).message(), Some("Invalid line number: x"));
}

#[test]
fn settings_prompt_changes_tab_size() {
    let mut sh = shell(&[""]);
    ctrl(&mut sh, 'b');
    assert_eq!(state(&sh).prompt.text(), "y, y, 4, #, n, n, n");
    for _ in 0..state(&sh).prompt.text().len() {
        key(&mut sh, KeyCode::Backspace);
    }
    answer_prompt(&mut sh, ", , 8");
    assert_eq!(sh.ctx.settings.tab_size, 8);
    assert_eq!(state(&sh).message(), Some("1 setting(s) changed"));
    key(&mut sh, KeyCode::Tab);
    assert_eq!(cursor(&sh), Position::new(0, 8));
}

#[test]
fn escape_closes_prompt_without_effect() {
    let mut sh = shell(&["a", "b"]);
    ctrl(&mut sh, 'g');
    type_str(&mut sh, "2");
    key(&mut sh, KeyCode::Esc);
    assert_eq!(state(&sh).mode, Mode::Normal);
    assert_eq!(cursor(&sh), Position::new(0, 0));
}

#[test]
fn ctrl_bracket_closes_prompt_at_once() {
    let mut sh = shell(&["a", "b"]);
    ctrl(&mut sh, 'f');
    type_str(&mut sh, "b");
    ctrl(&mut sh, ']');
    assert_eq!(state(&sh).mode, Mode::Normal);
    assert_eq!(cursor(&sh), Position::new(0, 0));
}

#[test]
fn resize_updates_layout_and_requests_full_repaint() {
    let mut sh = shell(&["a"]);
    assert_eq!(
        send(&mut sh, Event::Resize(100, 30)),
        Step::Continue { repaint_all: true }
    );
    assert_eq!(sh.layout(), ScreenLayout::new(100, 30));
    assert_eq!(sh.active().view.height, ScreenLayout::new(100, 30).text_height());
}

#[test]
fn redraw_asks_for_a_fresh_screen_size() {
    let mut sh = shell(&["a"]);
    assert_eq!(ctrl(&mut sh, 'd'), Step::Redraw);
    assert_eq!(send(&mut sh, Event::Redraw), Step::Redraw);
    // Ctrl-D inside a prompt is not a redraw.
    ctrl(&mut sh, 'g');
    assert_eq!(ctrl(&mut sh, 'd'), continue_step());
}

#[test]
fn recover_returns_to_normal_mode() {
    let mut sh = shell(&["a"]);
    ctrl(&mut sh, 'f');
    sh.recover("boom");
    assert_eq!(state(&sh).mode, Mode::Normal);
    assert_eq!(state(&sh).message(), Some("Internal error: boom"));
}
