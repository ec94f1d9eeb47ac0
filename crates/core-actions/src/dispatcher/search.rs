//! Find, find-again and interactive replace.
//!
//! Patterns are compiled with the `regex` crate. In plain mode the pattern is
//! escaped first, so both modes share one matcher; the case-sensitivity setting
//! maps to the builder's case-insensitive flag. Matches never span lines.
//!
//! Find searches forward from the cursor and wraps to the top of the buffer
//! once. Replace walks forward from the cursor to the end of the buffer without
//! wrapping, asking y/n/a/q per match unless "all" was chosen. All
//! replacements of one run form a single undo step.

use super::DispatchResult;
use super::prompt;
use crate::{EditError, ReplaceAnswer};
use core_config::Settings;
use core_state::{EditorState, Mode, PromptKind, ReplaceRun, SharedContext, UndoTag};
use core_text::{LineBuffer, Position, column};
use regex::{Regex, RegexBuilder};
use tracing::debug;

pub fn compile_pattern(pattern: &str, settings: &Settings) -> Result<Regex, EditError> {
    let source = if settings.regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    let re = RegexBuilder::new(&source)
        .case_insensitive(!settings.case_sensitive)
        .build()?;
    Ok(re)
}

/// First match on `text` starting at char column `from`: `(col, len)` in chars.
fn find_in_line(re: &Regex, text: &str, from: usize) -> Option<(usize, usize)> {
    if from > column::char_len(text) {
        return None;
    }
    let m = re.find_at(text, column::byte_index(text, from))?;
    Some((column::col_of_byte(text, m.start()), m.as_str().chars().count()))
}

/// Next match at or after `from`. With `wrap`, continues from the top of the
/// buffer. Returns the match position, its length in chars and whether the
/// search wrapped.
pub fn find_from(buf: &LineBuffer, re: &Regex, from: Position, wrap: bool) -> Option<(Position, usize, bool)> {
    for idx in from.line..buf.line_count() {
        let start = if idx == from.line { from.col } else { 0 };
        if let Some((col, len)) = find_in_line(re, buf.line(idx), start) {
            return Some((Position::new(idx, col), len, false));
        }
    }
    if !wrap {
        return None;
    }
    (0..=from.line.min(buf.line_count() - 1)).find_map(|idx| {
        find_in_line(re, buf.line(idx), 0).map(|(col, len)| (Position::new(idx, col), len, true))
    })
}

pub(super) fn start_find(state: &mut EditorState, ctx: &SharedContext) -> DispatchResult {
    prompt::open(state, PromptKind::Find, &ctx.find_pattern)
}

pub(super) fn find_again(state: &mut EditorState, ctx: &SharedContext) -> Result<DispatchResult, EditError> {
    if ctx.find_pattern.is_empty() {
        return Ok(start_find(state, ctx));
    }
    let from = Position::new(state.cursor.line, state.cursor.col + 1);
    find(state, ctx, from)
}

/// Move the cursor to the next match of the stored pattern at or after `from`.
pub(super) fn find(state: &mut EditorState, ctx: &SharedContext, from: Position) -> Result<DispatchResult, EditError> {
    let re = compile_pattern(&ctx.find_pattern, &ctx.settings)?;
    match find_from(&state.buffer, &re, from, true) {
        Some((pos, _, wrapped)) => {
            state.clear_mark();
            state.cursor = pos;
            if wrapped {
                state.set_message("Search wrapped");
            }
            debug!(target: "actions.search", line = pos.line, col = pos.col, wrapped, "found");
        }
        None => {
            state.set_message(format!("Not found: {}", ctx.find_pattern));
            debug!(target: "actions.search", pattern = %ctx.find_pattern, "not_found");
        }
    }
    Ok(DispatchResult::dirty())
}

pub(super) fn start_replace(state: &mut EditorState, ctx: &SharedContext) -> DispatchResult {
    prompt::open(state, PromptKind::ReplacePattern, &ctx.find_pattern)
}

/// Begin a replace run at the cursor with the stored pattern and replacement.
pub(super) fn begin_replace(state: &mut EditorState, ctx: &SharedContext) -> Result<DispatchResult, EditError> {
    let re = compile_pattern(&ctx.find_pattern, &ctx.settings)?;
    state.clear_mark();
    state.replace = Some(ReplaceRun {
        at: state.cursor,
        ..ReplaceRun::default()
    });
    let from = state.cursor;
    advance(state, ctx, &re, from)
}

pub(super) fn answer(
    state: &mut EditorState,
    ctx: &SharedContext,
    answer: ReplaceAnswer,
) -> Result<DispatchResult, EditError> {
    if state.mode != Mode::ReplaceConfirm {
        return Ok(DispatchResult::clean());
    }
    let Some(run) = state.replace.clone() else {
        return Ok(finish(state));
    };
    let re = compile_pattern(&ctx.find_pattern, &ctx.settings)?;
    let next = match answer {
        ReplaceAnswer::Yes => replace_current(state, ctx, &re)?,
        ReplaceAnswer::No => Position::new(run.at.line, run.at.col + run.len.max(1)),
        ReplaceAnswer::All => {
            if let Some(r) = state.replace.as_mut() {
                r.all = true;
            }
            replace_current(state, ctx, &re)?
        }
        ReplaceAnswer::Quit => return Ok(finish(state)),
    };
    advance(state, ctx, &re, next)
}

/// Find the next match from `from`; replace it straight away in "all" mode,
/// otherwise stop and ask.
fn advance(
    state: &mut EditorState,
    ctx: &SharedContext,
    re: &Regex,
    mut from: Position,
) -> Result<DispatchResult, EditError> {
    loop {
        let Some((pos, len, _)) = find_from(&state.buffer, re, from, false) else {
            return Ok(finish(state));
        };
        let Some(run) = state.replace.as_mut() else {
            return Ok(finish(state));
        };
        run.at = pos;
        run.len = len;
        if !run.all {
            state.cursor = pos;
            state.mode = Mode::ReplaceConfirm;
            return Ok(DispatchResult::dirty());
        }
        from = replace_current(state, ctx, re)?;
    }
}

/// Replace the match the run points at. Returns where searching resumes.
fn replace_current(state: &mut EditorState, ctx: &SharedContext, re: &Regex) -> Result<Position, EditError> {
    let Some(run) = state.replace.clone() else {
        return Ok(state.cursor);
    };
    let text = state.buffer.line(run.at.line);
    let start = column::byte_index(text, run.at.col);
    let end = column::byte_index(text, run.at.col + run.len);
    let replacement = match re.captures_at(text, start) {
        Some(caps) if ctx.settings.regex => {
            let mut out = String::new();
            caps.expand(&ctx.replace_with, &mut out);
            out
        }
        _ => ctx.replace_with.clone(),
    };
    let mut updated = String::new();
    updated.try_reserve(text.len() + replacement.len())?;
    updated.push_str(&text[..start]);
    updated.push_str(&replacement);
    updated.push_str(&text[end..]);

    state.record_lines(run.at.line, 1, UndoTag::Break, run.count > 0);
    state.buffer.set_line(run.at.line, updated);
    let col = run.at.col + replacement.chars().count();
    state.cursor = Position::new(run.at.line, col);
    if let Some(r) = state.replace.as_mut() {
        r.count += 1;
    }
    // An empty match must still move forward.
    let skip = usize::from(run.len == 0);
    Ok(Position::new(run.at.line, col + skip))
}

/// End the run and report how many matches were replaced.
pub(super) fn finish(state: &mut EditorState) -> DispatchResult {
    let count = state.replace.take().map_or(0, |r| r.count);
    state.mode = Mode::Normal;
    state.set_message(format!("{count} replacement(s)"));
    debug!(target: "actions.search", count, "replace_finished");
    DispatchResult::dirty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn plain_patterns_are_escaped() {
        let re = compile_pattern("a.b", &Settings::default()).unwrap();
        assert!(!re.is_match("axb"));
        assert!(re.is_match("a.b"));
    }

    #[test]
    fn case_insensitive_setting() {
        let settings = Settings {
            case_sensitive: false,
            ..Settings::default()
        };
        let re = compile_pattern("Foo", &settings).unwrap();
        assert!(re.is_match("a FOO b"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let settings = Settings {
            regex: true,
            ..Settings::default()
        };
        assert!(matches!(
            compile_pattern("(unclosed", &settings),
            Err(EditError::InvalidPattern(_))
        ));
    }

    #[test]
    fn find_uses_char_columns_and_wraps() {
        let b = buf(&["héllo wörld", "x", "wörld"]);
        let re = compile_pattern("wörld", &Settings::default()).unwrap();
        assert_eq!(
            find_from(&b, &re, Position::new(0, 0), true),
            Some((Position::new(0, 6), 5, false))
        );
        assert_eq!(
            find_from(&b, &re, Position::new(0, 7), true),
            Some((Position::new(2, 0), 5, false))
        );
        assert_eq!(
            find_from(&b, &re, Position::new(2, 1), true),
            Some((Position::new(0, 6), 5, true))
        );
        assert_eq!(find_from(&b, &re, Position::new(2, 1), false), None);
    }

    #[test]
    fn column_past_line_end_moves_to_next_line() {
        let b = buf(&["ab", "ab"]);
        let re = compile_pattern("ab", &Settings::default()).unwrap();
        assert_eq!(
            find_from(&b, &re, Position::new(0, 5), false),
            Some((Position::new(1, 0), 2, false))
        );
    }
}
