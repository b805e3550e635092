pub mod app;
pub mod audio;
pub mod board;
pub mod draw;
pub mod headless;
pub mod serde_duration;
pub mod session;
pub mod settings;
pub mod sfx;
pub mod view;
