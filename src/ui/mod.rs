pub mod app;
mod components;
mod evaluate;
mod generate;
mod status_bar;
pub mod theme;
mod widgets;

pub use app::render;
