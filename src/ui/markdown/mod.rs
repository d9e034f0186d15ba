//! Markdown to ratatui lines for the transcript pane.

mod render;
mod table;
mod wrap;


pub use render::{render_message, render_transcript, MessageRenderConfig};
