//! Capability set for the itinerary core.
//!
//! We use Crux's built-in Render capability directly because it provides
//! all necessary functionality for triggering view updates, and crux_http
//! for the CSV fetches. Everything else the shells do (timers, offline
//! caching, animation) reaches the core as plain events.

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::{App, Event};

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
