use crate::canvas::SharedCanvas;
use crate::overlay::{InputFrame, Overlay};
use crate::presenter::WindowCommand;
use crate::settings::Settings;
use anyhow::anyhow;
use eframe::egui;
use std::sync::mpsc::Receiver;
use std::time::Duration;

const TEXTURE_NAME: &str = "neoframe-canvas";

/// eframe application showing the composited canvas full size.
pub struct OverlayApp {
    canvas: SharedCanvas,
    overlay: Overlay,
    commands: Receiver<WindowCommand>,
    texture: Option<egui::TextureHandle>,
    frame_interval: Duration,
}

impl OverlayApp {
    pub fn new(
        canvas: SharedCanvas,
        overlay: Overlay,
        commands: Receiver<WindowCommand>,
        frame_interval: Duration,
    ) -> Self {
        Self {
            canvas,
            overlay,
            commands,
            texture: None,
            frame_interval,
        }
    }

    fn apply(&self, ctx: &egui::Context, command: WindowCommand) {
        tracing::debug!(?command, "window command");
        let viewport = match command {
            WindowCommand::SetTitle(title) => egui::ViewportCommand::Title(title),
            WindowCommand::SetPosition { x, y } => {
                egui::ViewportCommand::OuterPosition(egui::pos2(x as f32, y as f32))
            }
            WindowCommand::SetMousePassthrough(on) => egui::ViewportCommand::MousePassthrough(on),
        };
        ctx.send_viewport_cmd(viewport);
    }

    fn upload_frame(&mut self, ctx: &egui::Context) {
        let frame = self.canvas.composite();
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_bytes());
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture(TEXTURE_NAME, image, egui::TextureOptions::NEAREST));
            }
        }
    }
}

/// Map a position in window points to canvas pixels.
fn to_canvas(pos: egui::Pos2, screen: egui::Rect, canvas: (u32, u32)) -> (i32, i32) {
    let sx = if screen.width() > 0.0 {
        canvas.0 as f32 / screen.width()
    } else {
        1.0
    };
    let sy = if screen.height() > 0.0 {
        canvas.1 as f32 / screen.height()
    } else {
        1.0
    };
    (
        ((pos.x - screen.min.x) * sx).floor() as i32,
        ((pos.y - screen.min.y) * sy).floor() as i32,
    )
}

fn sample_input(ctx: &egui::Context, canvas: (u32, u32)) -> InputFrame {
    ctx.input(|i| {
        let screen = i.screen_rect();
        InputFrame {
            pointer: i.pointer.latest_pos().map(|pos| to_canvas(pos, screen, canvas)),
            primary_down: i.pointer.primary_down(),
            primary_pressed: i.pointer.primary_pressed(),
            primary_released: i.pointer.primary_released(),
            escape: i.key_pressed(egui::Key::Escape),
            ctrl: i.modifiers.ctrl,
        }
    })
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(ctx, command);
        }

        let input = sample_input(ctx, self.canvas.size());
        let overlay = &mut self.overlay;
        if let Some(passthrough) = self.canvas.with(|canvas| overlay.tick(canvas, &input)) {
            self.apply(ctx, WindowCommand::SetMousePassthrough(passthrough));
        }

        self.upload_frame(ctx);
        if let Some(texture) = &self.texture {
            let painter = ctx.layer_painter(egui::LayerId::background());
            painter.image(
                texture.id(),
                ctx.screen_rect(),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        ctx.request_repaint_after(self.frame_interval);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0; 4]
    }
}

/// Open the overlay window and block until it closes.
pub fn run(
    settings: &Settings,
    canvas: SharedCanvas,
    commands: Receiver<WindowCommand>,
) -> anyhow::Result<()> {
    let (width, height) = canvas.size();
    let window = &settings.window;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(window.title.clone())
            .with_inner_size([width as f32, height as f32])
            .with_position([window.x as f32, window.y as f32])
            .with_decorations(window.decorated)
            .with_transparent(settings.transparent_window())
            .with_mouse_passthrough(window.mouse_passthrough)
            .with_always_on_top(),
        ..Default::default()
    };

    let app = OverlayApp::new(
        canvas,
        Overlay::new(window.mouse_passthrough),
        commands,
        Duration::from_millis(settings.frame_interval_ms.max(1)),
    );
    tracing::info!(width, height, "opening overlay window");
    eframe::run_native(
        &window.title,
        native_options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|e| anyhow!("overlay window failed: {e}"))
}
