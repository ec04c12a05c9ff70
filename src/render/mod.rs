//! Renderers for the negotiated representations. Which one runs is decided
//! by [`crate::negotiate::negotiate`] and dispatched with a plain `match`.

pub mod html;
pub mod json;
pub mod plain;
