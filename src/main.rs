use clap::{CommandFactory, Parser};
use neoframe::cli::{Cli, Mode};
use neoframe::logging;
use neoframe::settings::Settings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config_path().to_string_lossy())?;
    cli.apply(&mut settings);

    let level = if settings.debug_logging {
        "debug"
    } else if settings.silent {
        "warn"
    } else {
        "info"
    };
    logging::init_with_level(settings.debug_logging, level, settings.log_file.clone());

    match cli.mode() {
        Mode::Info => {
            print_info(&settings);
            Ok(())
        }
        Mode::Server => server::run(settings),
        Mode::Client(cmd) => client(&settings, &cmd),
        Mode::Usage => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

fn print_info(settings: &Settings) {
    let (width, height) = settings.canvas_size();
    if settings.silent {
        println!("{width} {height}");
        return;
    }
    println!("NeoFrame {}", env!("CARGO_PKG_VERSION"));
    println!("Screen size:\n\t{width}\tpx width\n\t{height}\tpx height");
    println!("Unix domain socket:\n\t{}", settings.socket_path.display());
}

#[cfg(unix)]
fn client(settings: &Settings, cmd: &str) -> anyhow::Result<()> {
    let reply = neoframe::dispatch::send_command(&settings.socket_path, cmd)?;
    println!("{reply}");
    Ok(())
}

#[cfg(not(unix))]
fn client(_settings: &Settings, _cmd: &str) -> anyhow::Result<()> {
    anyhow::bail!("the control socket requires a unix platform")
}

#[cfg(unix)]
mod server {
    use anyhow::{bail, Context};
    use neoframe::assets::FontdueRasterizer;
    use neoframe::canvas::{Canvas, GlyphRasterizer, SharedCanvas};
    use neoframe::command::CommandInterpreter;
    use neoframe::dispatch::{spawn_stdin_prompt, ControlServer, Dispatcher};
    use neoframe::lifecycle::ProcessControl;
    use neoframe::presenter::{self, PresenterLink};
    use neoframe::scripting::{AppControl, CanvasFrame, ScriptBridge};
    use neoframe::settings::{FrontEnd, Settings};
    use std::sync::Arc;

    pub fn run(settings: Settings) -> anyhow::Result<()> {
        settings.validate()?;
        let (width, height) = settings.canvas_size();
        let canvas = SharedCanvas::new(
            Canvas::with_background(width, height, settings.background()?)
                .context("failed to create canvas")?,
        );

        // binding first turns a stale socket file into a startup error; no
        // connection is served until the startup script has finished
        let server = ControlServer::bind(&settings.socket_path)?;
        let control = Arc::new(ProcessControl::new(
            Some(settings.socket_path.clone()),
            settings.silent,
        ));
        control.install_ctrlc_handler()?;
        tracing::info!(
            socket = %settings.socket_path.display(),
            front_end = %settings.front_end,
            "server mode"
        );

        let font: Option<Arc<dyn GlyphRasterizer>> =
            match FontdueRasterizer::discover(settings.font_path.as_deref()) {
                Ok(font) => Some(Arc::new(font)),
                Err(err) => {
                    tracing::warn!("text drawing disabled: {err:#}");
                    None
                }
            };
        let (link, window_commands) = PresenterLink::channel();
        let frame = Arc::new(CanvasFrame::new(canvas.clone(), link, font));
        let bridge = ScriptBridge::new(frame, control.clone());

        if let Some(script) = &settings.startup_script {
            if let Err(err) = bridge.run_file(script) {
                control.release_socket();
                bail!("startup script failed: {err}");
            }
        }

        let dispatcher = match settings.front_end {
            FrontEnd::Commands => {
                Dispatcher::commands(CommandInterpreter::new(canvas.clone()), control.clone())
            }
            FrontEnd::Script => Dispatcher::script(bridge, control.clone()),
        };
        server.spawn(dispatcher.clone())?;
        if settings.prompt {
            spawn_stdin_prompt(dispatcher, settings.history_file.clone())?;
        }

        match presenter::run(&settings, canvas, window_commands) {
            Ok(()) => control.shutdown(0),
            Err(err) => {
                tracing::error!("{err:#}");
                control.shutdown(1);
            }
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod server {
    use neoframe::settings::Settings;

    pub fn run(_settings: Settings) -> anyhow::Result<()> {
        anyhow::bail!("server mode requires a unix platform")
    }
}
