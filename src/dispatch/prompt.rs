use crate::dispatch::Dispatcher;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "> ";

/// Interactive line prompt: each line is dispatched and the reply printed.
/// Non-blank lines are appended to `history` before they run.
/// End of input shuts the process down.
pub fn run_prompt(
    dispatcher: &Dispatcher,
    input: impl BufRead,
    mut output: impl Write,
    mut history: impl Write,
) {
    let mut lines = input.lines();
    loop {
        let _ = write!(output, "{PROMPT}");
        let _ = output.flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                tracing::warn!("failed to read prompt input: {err}");
                break;
            }
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = writeln!(history, "{line}") {
            tracing::debug!("failed to record prompt history: {err}");
        }
        let reply = dispatcher.dispatch(&line);
        let _ = writeln!(output, "{}", reply.text);
        if reply.shutdown {
            break;
        }
    }
    dispatcher.app().shutdown(0);
}

/// Open `path` for appending. History is best effort, so failures fall back
/// to discarding lines.
fn open_history(path: Option<PathBuf>) -> Box<dyn Write + Send> {
    let Some(path) = path else {
        return Box::new(io::sink());
    };
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Box::new(file),
        Err(err) => {
            tracing::warn!(path = %path.display(), "prompt history disabled: {err}");
            Box::new(io::sink())
        }
    }
}

/// Spawn the prompt on stdin/stdout.
pub fn spawn_stdin_prompt(
    dispatcher: Dispatcher,
    history_file: Option<PathBuf>,
) -> io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("neoframe-prompt".into())
        .spawn(move || {
            let history = open_history(history_file);
            run_prompt(&dispatcher, io::stdin().lock(), io::stdout(), history)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, SharedCanvas};
    use crate::command::CommandInterpreter;
    use crate::scripting::AppControl;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountExit(AtomicUsize);

    impl AppControl for CountExit {
        fn shutdown(&self, _code: i32) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn dispatcher(app: Arc<CountExit>) -> Dispatcher {
        let canvas = SharedCanvas::new(Canvas::new(8, 8).unwrap());
        Dispatcher::commands(CommandInterpreter::new(canvas), app)
    }

    #[test]
    fn prints_replies_and_exits_on_eof() {
        let app = Arc::new(CountExit::default());
        let mut out = Vec::new();
        run_prompt(&dispatcher(app.clone()), "clear\n\nwhat\n".as_bytes(), &mut out, io::sink());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "> OK\n> > Unknown command: what\n> ");
        assert_eq!(app.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_command_stops_reading() {
        let app = Arc::new(CountExit::default());
        let mut out = Vec::new();
        run_prompt(&dispatcher(app.clone()), "shutdown\nclear\n".as_bytes(), &mut out, io::sink());
        assert_eq!(String::from_utf8(out).unwrap(), "> OK\n");
        assert_eq!(app.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lines_are_appended_to_history_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neoframe.history");
        std::fs::write(&path, "box 0 0 1 1 FFFFFF\n").unwrap();

        let app = Arc::new(CountExit::default());
        let history = open_history(Some(path.clone()));
        run_prompt(&dispatcher(app), "cls\n  \npixel 1 1 FF0000\n".as_bytes(), io::sink(), history);

        let recorded = std::fs::read_to_string(&path).unwrap();
        assert_eq!(recorded, "box 0 0 1 1 FFFFFF\ncls\npixel 1 1 FF0000\n");
    }

    #[test]
    fn unwritable_history_does_not_stop_the_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let app = Arc::new(CountExit::default());
        let mut out = Vec::new();
        let history = open_history(Some(dir.path().join("missing").join("h")));
        run_prompt(&dispatcher(app), "cls\n".as_bytes(), &mut out, history);
        assert_eq!(String::from_utf8(out).unwrap(), "> OK\n> ");
    }
}
