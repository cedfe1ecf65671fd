use neoframe::canvas::{Canvas, SharedCanvas};
use neoframe::color::Color;
use neoframe::presenter::{PresenterLink, WindowCommand};
use neoframe::scripting::{AppControl, CanvasFrame, ScriptBridge, TriggerOutcome};
use serial_test::serial;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

struct NoExit(AtomicI32);

impl AppControl for NoExit {
    fn shutdown(&self, code: i32) {
        self.0.store(code, Ordering::SeqCst);
    }
}

struct Harness {
    canvas: SharedCanvas,
    bridge: ScriptBridge,
    window: Receiver<WindowCommand>,
}

fn harness() -> Harness {
    let canvas = SharedCanvas::new(Canvas::new(100, 80).unwrap());
    let (link, window) = PresenterLink::channel();
    let frame = Arc::new(CanvasFrame::new(canvas.clone(), link, None));
    let bridge = ScriptBridge::new(frame, Arc::new(NoExit(AtomicI32::new(-1))));
    Harness {
        canvas,
        bridge,
        window,
    }
}

#[test]
fn screen_size_matches_canvas() {
    let h = harness();
    let size = h.bridge.run("let s = getScreenSize(); s[0] * 1000 + s[1]").unwrap();
    assert_eq!(size.as_int(), Ok(100_080));
    let width = h.bridge.run("getScreenWidth() * 1000 + getScreenHeight()").unwrap();
    assert_eq!(width.as_int(), Ok(100_080));
}

#[test]
fn draw_calls_reach_the_canvas() {
    let h = harness();
    h.bridge
        .run(
            r#"
            drawBox(0, 0, 2, 2, "00FF00");
            let layer = createLayer();
            selectLayer(layer);
            drawPixel(50, 50, "FF0000FF");
            drawCircle(20, 20, 3, 1, true, "FFFFFF");
            "#,
        )
        .unwrap();

    let frame = h.canvas.composite();
    assert_eq!(frame.pixel(1, 1), Some(Color::rgba(0, 255, 0, 255)));
    assert_eq!(frame.pixel(50, 50), Some(Color::RED));
    assert_eq!(frame.pixel(20, 23), Some(Color::WHITE));
    assert_eq!(h.canvas.with(|c| c.layer_count()), 2);
}

#[test]
fn draw_text_without_font_returns_error_text() {
    let h = harness();
    let result = h.bridge.run(r#"drawText(0, 0, 12, "hi", "FFFFFF")"#).unwrap();
    assert_eq!(result.to_string(), "no font configured");
}

#[test]
fn window_calls_are_forwarded() {
    let h = harness();
    h.bridge
        .run(r#"setWindowTitle("demo"); setWindowPosition(5, 6);"#)
        .unwrap();
    assert_eq!(h.window.try_recv(), Ok(WindowCommand::SetTitle("demo".into())));
    assert_eq!(h.window.try_recv(), Ok(WindowCommand::SetPosition { x: 5, y: 6 }));
}

#[test]
fn file_helpers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    std::fs::write(&path, "hello").unwrap();
    let h = harness();

    let p = path.display();
    let read = h.bridge.run(&format!(r#"readFile("{p}")"#)).unwrap();
    assert_eq!(read.into_string().unwrap(), "hello");
    let exists = h.bridge.run(&format!(r#"fileExists("{p}")"#)).unwrap();
    assert_eq!(exists.as_bool(), Ok(true));
    let dir_exists = h
        .bridge
        .run(&format!(r#"fileExists("{}")"#, dir.path().display()))
        .unwrap();
    assert_eq!(dir_exists.as_bool(), Ok(false));
    let missing = h.bridge.run(&format!(r#"readFile("{p}.missing")"#)).unwrap();
    assert!(missing.is_unit());
    assert!(!h.bridge.run("pwd()").unwrap().to_string().is_empty());
}

#[test]
#[serial]
fn relative_paths_follow_the_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    std::fs::write("relative.txt", "from cwd").unwrap();
    let here = std::env::current_dir().unwrap();

    let h = harness();
    let read = h.bridge.run(r#"readFile("relative.txt")"#);
    let exists = h.bridge.run(r#"fileExists("relative.txt")"#);
    let pwd = h.bridge.run("pwd()");
    std::env::set_current_dir(previous).unwrap();

    assert_eq!(read.unwrap().into_string().unwrap(), "from cwd");
    assert_eq!(exists.unwrap().as_bool(), Ok(true));
    assert_eq!(pwd.unwrap().into_string().unwrap(), here.display().to_string());
}

#[test]
fn out_of_range_script_numbers_are_clamped() {
    let h = harness();
    h.bridge
        .run(
            r#"
            drawCircle(5, 5, 9999999999, 0, true, "FFFFFF");
            drawLine(0, 0, 1, -99999999999, 1, "FF0000");
            drawBox(-99999999999, 0, 99999999999, 1, "00FF00");
            "#,
        )
        .unwrap();

    let frame = h.canvas.composite();
    assert_eq!(frame.pixel(0, 0), Some(Color::RED));
    assert_eq!(frame.pixel(99, 79), Some(Color::WHITE));
}

#[test]
fn runtime_error_is_reported_not_fatal() {
    let h = harness();
    let err = h.bridge.run("let x = 1; x.no_such_method()").unwrap_err();
    assert!(err.message.contains("no_such_method"));
    assert_eq!(h.bridge.run("1 + 1").unwrap().as_int(), Ok(2));
}

#[test]
fn on_demand_trigger_lookup() {
    let h = harness();
    h.bridge
        .run(r#"trigger("mark", || drawPixel(1, 1, "FFFFFF"))"#)
        .unwrap();
    assert!(matches!(h.bridge.run_trigger("mark"), Ok(TriggerOutcome::Ran(_))));
    assert!(matches!(h.bridge.run_trigger("other"), Ok(TriggerOutcome::NotFound)));
    assert_eq!(h.canvas.composite().pixel(1, 1), Some(Color::WHITE));
}

#[test]
fn timer_removed_before_first_tick_never_runs() {
    let h = harness();
    h.bridge
        .run(r#"timer("blink", 80, || drawPixel(2, 2, "FFFFFF")); rmTrigger("blink");"#)
        .unwrap();
    sleep(Duration::from_millis(250));
    assert_eq!(h.canvas.composite().pixel(2, 2), Some(Color::TRANSPARENT));
}

#[test]
fn timer_repeats_until_it_returns_false() {
    let h = harness();
    h.bridge
        .run(
            r#"
            fn step() {
                let n = layerCount();
                if n >= 4 { return false; }
                createLayer();
                true
            }
            timer("grow", 5, || step());
            "#,
        )
        .unwrap();
    sleep(Duration::from_millis(300));
    assert_eq!(h.canvas.with(|c| c.layer_count()), 4);
    assert!(h.bridge.trigger_names().is_empty());
}
