pub mod assets;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod command;
pub mod dispatch;
pub mod lifecycle;
pub mod logging;
pub mod overlay;
pub mod presenter;
pub mod scripting;
pub mod settings;
