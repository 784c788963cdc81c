//! dashgrid
//!
//! Two building blocks for data-heavy dashboards, plus a terminal viewer
//! that puts them together:
//!
//! - [`cache`]: a TTL-aware response cache with an in-memory tier and a
//!   durable tier that survives restarts.
//! - [`view_state`]: a windowed list engine that filters, sorts and
//!   virtualizes large row sets so only the visible slice is materialized.
//!
//! The binary loads a JSON array of objects through the cache and browses it
//! in a virtualized table. Core logic is pure; terminal and file access live
//! in [`source`], [`view`] and [`logging`].

pub mod cache;
pub mod config;
pub mod logging;
pub mod model;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;
