//! Link creation, resolution and deletion on top of the routed store, the
//! index registry and the URL cache.

pub mod service;
pub mod settings;
pub mod shortener;

pub use burrow_core::ShortenerError;
pub use service::LinkService;
pub use settings::ServiceSettings;
pub use shortener::{LinkCount, Shortener};
