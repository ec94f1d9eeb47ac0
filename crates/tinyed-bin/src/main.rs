//! tinyed entrypoint.
use anyhow::{Result, bail};
use clap::Parser;
use core_actions::{Shell, Step};
use core_config::{Settings, load_from};
use core_events::Event;
use core_input::{CrosstermEvents, EventSource, Vt100Decoder};
use core_model::{ExitOutcome, ScreenLayout};
use core_render::Renderer;
use core_state::SharedContext;
use core_terminal::{ScreenSize, StdioTransport, TerminalGuard, Transport};
use std::any::Any;
use std::io::{IsTerminal, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tinyed", version, about = "Tiny VT100 screen editor")]
struct Args {
    /// Files to open, one buffer each. Without any, piped standard input is
    /// edited as an unnamed buffer and written to standard output on exit.
    files: Vec<PathBuf>,
    /// Maximum undo history entries per buffer.
    #[arg(long = "undo", value_name = "N")]
    undo: Option<usize>,
    /// Indentation width used by Tab, indent and autoindent.
    #[arg(long = "tab-size", value_name = "N")]
    tab_size: Option<usize>,
    /// Configuration file path (overrides discovery of `tinyed.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Decode raw VT100 bytes from standard input and probe the screen size
    /// with a cursor position report.
    #[arg(long = "vt100")]
    vt100: bool,
}

/// Terminal seen by the event loop: a source of events and a sink for frames.
trait Screen {
    fn next_event(&mut self) -> Result<Event>;
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    /// Current size, when it cannot arrive as a resize event.
    fn refresh_size(&mut self) -> Result<Option<ScreenSize>>;
}

impl<T: Transport> Screen for Vt100Decoder<T> {
    fn next_event(&mut self) -> Result<Event> {
        EventSource::next_event(self)
    }
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.transport().write(bytes)
    }
    fn refresh_size(&mut self) -> Result<Option<ScreenSize>> {
        self.transport().screen_size().map(Some)
    }
}

struct CrosstermScreen<'a> {
    out: &'a mut StdioTransport,
    events: CrosstermEvents,
}

impl Screen for CrosstermScreen<'_> {
    fn next_event(&mut self) -> Result<Event> {
        self.events.next_event()
    }
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write(bytes)
    }
    // crossterm delivers resizes as events.
    fn refresh_size(&mut self) -> Result<Option<ScreenSize>> {
        Ok(None)
    }
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("tinyed.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "tinyed.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // A global subscriber is already installed; dropping the guard stops the writer.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Command line values take precedence over the config file.
fn apply_overrides(args: &Args, settings: &mut Settings) {
    if let Some(n) = args.undo {
        settings.undo_limit = n.max(1);
    }
    if let Some(n) = args.tab_size {
        settings.tab_size = n.clamp(1, 32);
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

fn paint<S: Screen + ?Sized>(renderer: &mut Renderer, shell: &Shell, screen: &mut S) -> Result<()> {
    let frame = renderer.render(shell.active())?;
    screen.write(&frame)
}

/// Blocking loop: one event, one dispatch, one frame. A panic while handling an
/// event is reported on the status line and the loop carries on.
fn run<S: Screen + ?Sized>(shell: &mut Shell, screen: &mut S) -> Result<ExitOutcome> {
    let mut renderer = Renderer::new();
    paint(&mut renderer, shell, screen)?;
    loop {
        let event = screen.next_event()?;
        let step = match panic::catch_unwind(AssertUnwindSafe(|| shell.handle_event(&event))) {
            Ok(step) => step,
            Err(payload) => {
                let what = panic_text(payload.as_ref());
                error!(target: "runtime", what = %what, ?event, "event_handler_panicked");
                shell.recover(&what);
                Step::Continue { repaint_all: true }
            }
        };
        match step {
            Step::Exit(outcome) => return Ok(outcome),
            Step::Redraw => {
                match screen.refresh_size() {
                    Ok(Some(size)) => {
                        shell.handle_event(&Event::Resize(size.cols, size.rows));
                    }
                    Ok(None) => {}
                    Err(e) => warn!(target: "runtime", error = %e, "screen_size_refresh_failed"),
                }
                renderer.invalidate();
                paint(&mut renderer, shell, screen)?;
            }
            Step::Continue { repaint_all } => {
                if repaint_all {
                    renderer.invalidate();
                }
                paint(&mut renderer, shell, screen)?;
            }
        }
    }
}

fn open_buffers(shell: &mut Shell, args: &Args, piped: Option<&str>) {
    match piped {
        Some(text) => shell.open_text(text),
        None if args.files.is_empty() => shell.open_empty(),
        None => {
            for path in &args.files {
                shell.open_path(path);
            }
            // Start on the first file named.
            shell.workspace.focus(0);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let mut settings = config.settings();
    apply_overrides(&args, &mut settings);

    let piped = if args.files.is_empty() && !std::io::stdin().is_terminal() {
        if args.vt100 {
            bail!("--vt100 reads keys from standard input and cannot edit piped input");
        }
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Some(text)
    } else {
        None
    };
    info!(
        target: "runtime.startup",
        files = args.files.len(),
        piped = piped.is_some(),
        vt100 = args.vt100,
        config_override = args.config.is_some(),
        "bootstrap_complete"
    );

    let outcome = if args.vt100 {
        let mut decoder = Vt100Decoder::new(StdioTransport::new(true));
        // The transport restores the terminal when the decoder drops.
        decoder.transport().enter()?;
        let size = decoder.transport().screen_size()?;
        let mut shell = Shell::new(SharedContext::new(settings), ScreenLayout::new(size.cols, size.rows));
        open_buffers(&mut shell, &args, None);
        run(&mut shell, &mut decoder)
    } else {
        let mut transport = StdioTransport::new(false);
        let mut guard = TerminalGuard::enter(&mut transport)?;
        let size = guard.transport().screen_size()?;
        let mut shell = Shell::new(SharedContext::new(settings), ScreenLayout::new(size.cols, size.rows));
        open_buffers(&mut shell, &args, piped.as_deref());
        let mut screen = CrosstermScreen {
            out: guard.transport(),
            events: CrosstermEvents::new(),
        };
        run(&mut shell, &mut screen)
    };

    // The terminal has been restored by now.
    match outcome {
        Ok(ExitOutcome::Content(text)) => {
            let mut out = std::io::stdout().lock();
            out.write_all(text.as_bytes())?;
            if !text.is_empty() {
                out.write_all(b"\n")?;
            }
            info!(target: "runtime", bytes = text.len(), "exit_with_content");
        }
        Ok(ExitOutcome::FileName(path)) => {
            info!(target: "runtime", file = %path.display(), "exit");
        }
        Err(e) => {
            warn!(target: "runtime", error = %e, "event_loop_failed");
            return Err(e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::ScriptedTransport;

    fn shell(text: &str) -> Shell {
        let mut sh = Shell::new(SharedContext::new(Settings::default()), ScreenLayout::new(20, 5));
        sh.open_text(text);
        sh
    }

    #[test]
    fn scripted_session_types_and_exits_with_content() {
        let mut sh = shell("");
        // "hi", Ctrl-Q, answer y to the unsaved-changes question.
        let mut screen = Vt100Decoder::new(ScriptedTransport::new(b"hi\x11y"));
        let outcome = run(&mut sh, &mut screen).unwrap();
        assert_eq!(outcome, ExitOutcome::Content("hi".to_string()));
        let shown = String::from_utf8_lossy(&screen.transport().output).into_owned();
        assert!(shown.contains("hi"));
    }

    #[test]
    fn exhausted_input_ends_the_loop_with_an_error() {
        let mut sh = shell("abc");
        let mut screen = Vt100Decoder::new(ScriptedTransport::new(b"\x1b[C"));
        assert!(run(&mut sh, &mut screen).is_err());
        assert_eq!(sh.active().state.cursor.col, 1);
    }

    #[test]
    fn redraw_key_picks_up_new_screen_size() {
        let mut sh = shell("abc");
        // Ctrl-D, then the report of a terminal resized to 30x10.
        let mut screen = Vt100Decoder::new(ScriptedTransport::new(b"\x04\x1b[10;30R"));
        assert!(run(&mut sh, &mut screen).is_err());
        assert_eq!(sh.layout(), ScreenLayout::new(30, 10));
        assert_eq!(sh.active().view.height, ScreenLayout::new(30, 10).text_height());
        let output = &screen.transport().output;
        assert!(output.windows(4).any(|w| w == b"\x1b[6n"));
    }

    #[test]
    fn malformed_size_report_keeps_layout() {
        let mut sh = shell("abc");
        let mut screen = Vt100Decoder::new(ScriptedTransport::new(b"\x04\x1b[10x"));
        assert!(run(&mut sh, &mut screen).is_err());
        assert_eq!(sh.layout(), ScreenLayout::new(20, 5));
    }

    #[test]
    fn cli_overrides_win_over_config() {
        let args = Args::parse_from(["tinyed", "--undo", "0", "--tab-size", "99", "a.txt"]);
        let mut settings = Settings::default();
        apply_overrides(&args, &mut settings);
        assert_eq!(settings.undo_limit, 1);
        assert_eq!(settings.tab_size, 32);
        assert_eq!(args.files, vec![PathBuf::from("a.txt")]);
        assert!(!args.vt100);
    }

    #[test]
    fn first_named_file_has_focus() {
        let dir = std::env::temp_dir();
        let args = Args::parse_from([
            "tinyed".into(),
            dir.join("tinyed-a-missing").into_os_string(),
            dir.join("tinyed-b-missing").into_os_string(),
        ]);
        let mut sh = Shell::new(SharedContext::new(Settings::default()), ScreenLayout::new(20, 5));
        open_buffers(&mut sh, &args, None);
        assert_eq!(sh.workspace.len(), 2);
        assert_eq!(sh.workspace.active_index(), 0);
    }

    #[test]
    fn panic_payload_text() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_text(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_text(payload.as_ref()), "bang");
    }
}
