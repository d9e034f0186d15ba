//! Terminal UI for interactive chat sessions.
//!
//! - [`chat_loop`]: terminal lifecycle, input routing and the event loop that
//!   drives [`crate::core::controller::ChatController`].
//! - [`renderer`]: frame composition (header, sidebar, transcript, composer).
//! - [`markdown`]: message-to-lines rendering with wrapping and highlighting.
//! - [`state`] and [`picker`]: presentation-only state.
//! - [`theme`]: color and style policy.
//!
//! This layer never talks to the backend directly; everything goes through
//! the controller.

pub mod chat_loop;
pub mod markdown;
pub mod picker;
pub mod renderer;
pub mod state;
pub mod theme;
