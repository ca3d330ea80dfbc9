//! Client-side core of a web RSS reader.
//!
//! The crate is built around a unidirectional data flow:
//!
//! - [`state`]: the immutable [`state::AppState`] value, the closed
//!   [`state::Action`] protocol, the pure [`state::transition`] reducer, and
//!   the subscribable [`state::Store`] that serializes updates.
//! - [`controller`]: the async [`controller::Controller`] that keeps the
//!   store synchronized with the backend: bootstrap, background refresh,
//!   aggregate fan-out, lazy per-feed loads, and mutations with optimistic
//!   read-state updates.
//! - [`view`]: pure derived-view computations (filtered/sorted article
//!   lists, day grouping, feeds by folder) recomputed from each snapshot.
//! - [`api`]: the [`api::RemoteData`] service contract and its HTTP
//!   implementation.
//! - [`prefs`]: the durable refresh-interval preference.
//!
//! A host embeds the core by constructing a store, a service, and a
//! controller, then rendering from store snapshots:
//!
//! ```no_run
//! use eddy::api::HttpRemoteData;
//! use eddy::controller::Controller;
//! use eddy::prefs::Preferences;
//! use eddy::state::Store;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpRemoteData::new("http://localhost:8000/api/v1")?;
//! let prefs = Preferences::load("prefs.toml")?;
//! let controller = Controller::new(Store::default(), api, prefs);
//!
//! let mut changes = controller.store().subscribe();
//! controller.start().await;
//! while changes.changed().await.is_ok() {
//!     let snapshot = changes.borrow_and_update().clone();
//!     let _visible = eddy::view::visible_articles(&snapshot);
//!     // hand the snapshot to the presentation layer
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod controller;
pub mod model;
pub mod prefs;
pub mod state;
pub mod view;

pub use controller::Controller;
pub use state::{Action, AppState, Store};
