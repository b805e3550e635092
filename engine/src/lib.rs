pub mod app;
pub mod audio;
pub mod digest;
pub mod graphics;
pub mod scheduler;
pub mod surface;
pub mod ui;
pub mod view_tree;
