//! The unidirectional state container: state shape, action protocol, pure
//! reducer, and the injectable store object that ties them together.

mod action;
mod app_state;
mod reducer;
mod store;

pub use action::Action;
pub use app_state::{AppState, Modal, ModalKind, ReadFilter, Selection, SortOrder, ViewStyle};
pub use reducer::transition;
pub use store::Store;
