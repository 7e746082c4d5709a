//! Terminal UI layer for interactive coaching sessions.
//!
//! - [`chat_loop`]: terminal lifecycle, key handling and the event loop that
//!   dispatches work to [`crate::core::controller`].
//! - [`renderer`]: frame layout and the transcript view.
//! - [`message_input`], [`edit_modal`], [`temperature`] and [`debug_panel`]:
//!   the individual controls.
//!
//! Ownership boundary: this layer presents and captures interaction state,
//! while [`crate::core`] owns session state and API coordination.

pub mod chat_loop;
pub mod debug_panel;
pub mod edit_modal;
pub mod message_input;
pub mod renderer;
pub mod temperature;
