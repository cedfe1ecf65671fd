//! Embedded Rhai runtime with named triggers and repeating timers.
//!
//! A single long-lived runtime serves every entry point: script lines from
//! the dispatch front ends, the startup script and timer ticks. Entry points
//! are serialized by the runtime lock; the trigger table has its own lock so
//! registering or removing triggers never waits on a running callback.

pub mod format;
pub mod host;
pub mod triggers;

pub use host::{AppControl, CanvasFrame, FrameCapability};
pub use triggers::{Trigger, TriggerTable};

use rhai::{Dynamic, Engine, EvalAltResult, FnPtr, Scope, AST};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    fn from_eval(err: &EvalAltResult) -> Self {
        let pos = err.position();
        Self {
            message: err.to_string(),
            line: pos.line().filter(|line| *line > 0),
            column: pos.position().filter(|col| *col > 0),
        }
    }

    fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let detail = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::new(format!("script host panicked: {detail}"))
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // rhai messages already carry their position
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScriptError {}

/// Result of invoking a trigger by name.
#[derive(Debug, Clone)]
pub enum TriggerOutcome {
    /// Nothing is registered under that name.
    NotFound,
    /// The callback ran and returned this value.
    Ran(Dynamic),
}

impl TriggerOutcome {
    pub fn ran(&self) -> bool {
        matches!(self, Self::Ran(_))
    }
}

struct ScriptRuntime {
    engine: Engine,
    scope: Scope<'static>,
    /// Every function defined so far; merged into each new script.
    lib: AST,
}

pub(crate) struct BridgeInner {
    runtime: Mutex<ScriptRuntime>,
    pub(crate) triggers: TriggerTable<FnPtr>,
}

impl BridgeInner {
    fn runtime(&self) -> MutexGuard<'_, ScriptRuntime> {
        // callbacks run under catch_unwind, so poisoning only follows a
        // panic in host code; the runtime itself is still usable
        self.runtime
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn call(&self, callback: &FnPtr) -> Result<Dynamic, ScriptError> {
        let runtime = self.runtime();
        protected(|| callback.call::<Dynamic>(&runtime.engine, &runtime.lib, ()))
    }
}

/// Run `f`, turning script errors and host panics into [`ScriptError`].
fn protected<T>(
    f: impl FnOnce() -> Result<T, Box<EvalAltResult>>,
) -> Result<T, ScriptError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ScriptError::from_eval(&err)),
        Err(payload) => Err(ScriptError::from_panic(payload)),
    }
}

#[derive(Clone)]
pub struct ScriptBridge {
    inner: Arc<BridgeInner>,
}

impl std::fmt::Debug for ScriptBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptBridge")
            .field("triggers", &self.inner.triggers.names())
            .finish()
    }
}

impl ScriptBridge {
    pub fn new(frame: Arc<dyn FrameCapability>, app: Arc<dyn AppControl>) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<BridgeInner>| {
            let mut engine = Engine::new();
            host::register_host_api(&mut engine, weak.clone(), frame, app);
            BridgeInner {
                runtime: Mutex::new(ScriptRuntime {
                    engine,
                    scope: Scope::new(),
                    lib: AST::empty(),
                }),
                triggers: TriggerTable::new(),
            }
        });
        Self { inner }
    }

    /// Compile and run `source` in the shared runtime.
    ///
    /// Top-level variables and functions stay defined for later calls.
    pub fn run(&self, source: &str) -> Result<Dynamic, ScriptError> {
        let mut guard = self.inner.runtime();
        let runtime = &mut *guard;
        let compiled = runtime.engine.compile(source).map_err(|e| {
            let err: Box<EvalAltResult> = e.into();
            ScriptError::from_eval(&err)
        })?;
        let ast = runtime.lib.merge(&compiled);

        let result = protected(|| {
            runtime
                .engine
                .eval_ast_with_scope::<Dynamic>(&mut runtime.scope, &ast)
        });
        // keep functions even when the script failed part way through
        runtime.lib.combine(compiled.clone_functions_only());
        result
    }

    /// Read, compile and execute a script file once.
    pub fn run_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ScriptError::new(format!("failed to read script {}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "running script");
        self.run(&source).map(|_| ())
    }

    /// Invoke the trigger registered under `name`.
    ///
    /// The table lock is released before the callback runs.
    pub fn run_trigger(&self, name: &str) -> Result<TriggerOutcome, ScriptError> {
        let Some(trigger) = self.inner.triggers.lookup(name) else {
            return Ok(TriggerOutcome::NotFound);
        };
        self.inner.call(&trigger.callback).map(TriggerOutcome::Ran)
    }

    pub fn trigger_names(&self) -> Vec<String> {
        self.inner.triggers.names()
    }

    pub fn remove_trigger(&self, name: &str) -> bool {
        self.inner.triggers.remove(name)
    }

    pub fn clear_triggers(&self) {
        self.inner.triggers.clear();
    }
}

enum Tick {
    Continue,
    Stop,
}

/// One timer tick: run the trigger if it still belongs to this timer.
fn timer_tick(inner: &BridgeInner, name: &str, generation: u64) -> Tick {
    let trigger = match inner.triggers.lookup(name) {
        Some(trigger) if trigger.generation == generation => trigger,
        _ => {
            tracing::debug!(timer = name, "timer trigger gone, stopping");
            return Tick::Stop;
        }
    };
    match inner.call(&trigger.callback) {
        Ok(value) if value.as_bool() == Ok(false) => {
            tracing::debug!(timer = name, "timer callback returned false, stopping");
            inner.triggers.remove_if_generation(name, generation);
            Tick::Stop
        }
        Ok(_) => Tick::Continue,
        Err(err) => {
            tracing::warn!(timer = name, "timer trigger error: {err}");
            inner.triggers.remove_if_generation(name, generation);
            Tick::Stop
        }
    }
}

/// Start a background loop that fires `name` every `interval_ms` until the
/// trigger is removed, replaced, fails or returns `false`.
pub(crate) fn spawn_timer(
    bridge: Weak<BridgeInner>,
    name: &str,
    interval_ms: i64,
    generation: u64,
) -> std::io::Result<()> {
    let interval = Duration::from_millis(interval_ms.max(1) as u64);
    let name = name.to_string();
    thread::Builder::new()
        .name(format!("neoframe-timer-{name}"))
        .spawn(move || loop {
            thread::sleep(interval);
            let Some(inner) = bridge.upgrade() else {
                return;
            };
            if let Tick::Stop = timer_tick(&inner, &name, generation) {
                return;
            }
        })
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasError;
    use crate::color::Color;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::time::Instant;

    #[derive(Default)]
    struct Recorder {
        lines: AtomicUsize,
        boxes: AtomicUsize,
        shutdown: AtomicI32,
        /// `draw_box` waits on this while a test holds it.
        hold: Mutex<()>,
    }

    impl FrameCapability for Recorder {
        fn screen_size(&self) -> (u32, u32) {
            (640, 480)
        }
        fn debug_print(&self, _text: &str) {}
        fn draw_line(&self, _: i32, _: i32, _: i32, _: i32, _: i32, _: Color) {
            self.lines.fetch_add(1, Ordering::SeqCst);
        }
        fn draw_text(&self, _: i32, _: i32, _: f32, _: &str, _: Color) -> anyhow::Result<()> {
            Ok(())
        }
        fn draw_box(&self, _: i32, _: i32, _: i32, _: i32, _: Color) {
            self.boxes.fetch_add(1, Ordering::SeqCst);
            let _held = self.hold.lock().unwrap_or_else(|p| p.into_inner());
        }
        fn draw_pixel(&self, _: i32, _: i32, _: Color) {}
        fn draw_circle(&self, _: i32, _: i32, _: i32, _: i32, _: bool, _: Color) {}
        fn draw_grid(&self, _: i32, _: i32, _: Color) -> Result<(), CanvasError> {
            Ok(())
        }
        fn clear_layer(&self, _: usize) {}
        fn create_layer(&self) -> usize {
            1
        }
        fn select_layer(&self, _: usize) {}
        fn delete_layer(&self, _: usize) {}
        fn layer_count(&self) -> usize {
            1
        }
        fn current_layer(&self) -> usize {
            0
        }
        fn set_layer_visible(&self, _: usize, _: bool) {}
        fn set_window_title(&self, _: &str) {}
        fn set_window_position(&self, _: i32, _: i32) {}
    }

    impl AppControl for Recorder {
        fn shutdown(&self, code: i32) {
            self.shutdown.store(code, Ordering::SeqCst);
        }
    }

    fn bridge() -> (ScriptBridge, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let bridge = ScriptBridge::new(recorder.clone(), recorder.clone());
        (bridge, recorder)
    }

    #[test]
    fn globals_and_functions_survive_between_runs() {
        let (bridge, _) = bridge();
        bridge.run("let base = 40; fn add_two(x) { x + 2 }").unwrap();
        let value = bridge.run("add_two(base)").unwrap();
        assert_eq!(value.as_int(), Ok(42));
    }

    #[test]
    fn compile_errors_carry_position() {
        let (bridge, _) = bridge();
        let err = bridge.run("let x = ;").unwrap_err();
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn missing_trigger_is_not_an_error() {
        let (bridge, _) = bridge();
        assert!(matches!(
            bridge.run_trigger("nope"),
            Ok(TriggerOutcome::NotFound)
        ));
    }

    #[test]
    fn trigger_runs_callback_on_demand() {
        let (bridge, recorder) = bridge();
        let name = bridge
            .run(r#"trigger("paint", || drawLine(0, 0, 5, 5, "FF0000"))"#)
            .unwrap();
        assert_eq!(name.into_string().unwrap(), "paint");

        assert!(bridge.run_trigger("paint").unwrap().ran());
        assert!(bridge.run_trigger("paint").unwrap().ran());
        assert_eq!(recorder.lines.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_trigger_reports_error() {
        let (bridge, _) = bridge();
        bridge.run(r#"trigger("bad", || { throw "boom"; })"#).unwrap();
        let err = bridge.run_trigger("bad").unwrap_err();
        assert!(err.message.contains("boom"));
    }

    #[test]
    fn script_can_run_trigger_by_name() {
        let (bridge, recorder) = bridge();
        bridge
            .run(r#"trigger("line", || drawLine(1, 1, 2, 2, "FFFFFF"));"#)
            .unwrap();
        let found = bridge
            .run(r#"runTrigger("line") && !runTrigger("other")"#)
            .unwrap();
        assert_eq!(found.as_bool(), Ok(true));
        assert_eq!(recorder.lines.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bad_color_is_returned_to_script() {
        let (bridge, recorder) = bridge();
        let result = bridge.run(r#"drawLine(0, 0, 1, 1, "nope")"#).unwrap();
        assert!(result.into_string().unwrap().contains("invalid color string"));
        assert_eq!(recorder.lines.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_timer_name_defaults() {
        let (bridge, _) = bridge();
        bridge.run(r#"timer("", 60000, || true)"#).unwrap();
        assert_eq!(bridge.trigger_names(), vec!["timer".to_string()]);
    }

    #[test]
    fn rm_and_clear_triggers_from_script() {
        let (bridge, _) = bridge();
        bridge
            .run(r#"trigger("a", || 1); trigger("b", || 2); rmTrigger("a")"#)
            .unwrap();
        assert_eq!(bridge.trigger_names(), vec!["b".to_string()]);
        bridge.run("clearTriggers()").unwrap();
        assert!(bridge.trigger_names().is_empty());
    }

    #[test]
    fn timer_stops_when_callback_returns_false() {
        let (bridge, recorder) = bridge();
        bridge
            .run(r#"timer("once", 5, || { drawLine(0, 0, 1, 1, "FFFFFF"); false })"#)
            .unwrap();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(recorder.lines.load(Ordering::SeqCst), 1);
        assert!(bridge.trigger_names().is_empty());
    }

    #[test]
    fn timer_keeps_firing_until_removed() {
        let (bridge, recorder) = bridge();
        bridge
            .run(r#"timer("tick", 5, || drawLine(0, 0, 1, 1, "FFFFFF"))"#)
            .unwrap();
        thread::sleep(Duration::from_millis(150));
        assert!(bridge.remove_trigger("tick"));
        thread::sleep(Duration::from_millis(30));
        let fired = recorder.lines.load(Ordering::SeqCst);
        assert!(fired >= 2, "timer fired {fired} times");
        thread::sleep(Duration::from_millis(60));
        assert_eq!(recorder.lines.load(Ordering::SeqCst), fired);
    }

    #[test]
    fn removed_before_first_tick_never_fires() {
        let (bridge, recorder) = bridge();
        bridge
            .run(r#"timer("t", 50, || drawLine(0, 0, 1, 1, "FFFFFF")); rmTrigger("t")"#)
            .unwrap();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(recorder.lines.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_timer_is_removed() {
        let (bridge, _) = bridge();
        bridge.run(r#"timer("bad", 5, || { throw "nope"; })"#).unwrap();
        thread::sleep(Duration::from_millis(150));
        assert!(bridge.trigger_names().is_empty());
    }

    #[test]
    fn replaced_timer_stops_old_loop() {
        let (bridge, recorder) = bridge();
        bridge
            .run(r#"timer("t", 5, || drawLine(0, 0, 1, 1, "FFFFFF"))"#)
            .unwrap();
        bridge.run(r#"trigger("t", || 0)"#).unwrap();
        thread::sleep(Duration::from_millis(30));
        let fired = recorder.lines.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(60));
        assert_eq!(recorder.lines.load(Ordering::SeqCst), fired);
        assert_eq!(bridge.trigger_names(), vec!["t".to_string()]);
    }

    #[test]
    fn trigger_table_stays_usable_while_a_timer_callback_blocks() {
        let (bridge, recorder) = bridge();
        let held = recorder.hold.lock().unwrap();
        bridge
            .run(r#"timer("slow", 5, || drawBox(0, 0, 1, 1, "FFFFFF"))"#)
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while recorder.boxes.load(Ordering::SeqCst) == 0 {
            assert!(Instant::now() < deadline, "timer never fired");
            thread::sleep(Duration::from_millis(2));
        }

        let started = Instant::now();
        assert_eq!(bridge.trigger_names(), vec!["slow".to_string()]);
        assert!(bridge.remove_trigger("slow"));
        assert!(bridge.trigger_names().is_empty());
        assert!(started.elapsed() < Duration::from_millis(100));

        drop(held);
        thread::sleep(Duration::from_millis(60));
        assert_eq!(recorder.boxes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_reaches_app_control() {
        let (bridge, recorder) = bridge();
        bridge.run("shutdown(3)").unwrap();
        assert_eq!(recorder.shutdown.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn logf_accepts_mixed_arguments() {
        let (bridge, _) = bridge();
        bridge.run(r#"logf("%s=%d", "x", 5)"#).unwrap();
        bridge.run(r#"logf("plain")"#).unwrap();
    }
}
