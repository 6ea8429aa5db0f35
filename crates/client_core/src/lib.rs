pub mod config;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod list_controller;
pub mod notice;

pub use config::{load_settings, ClientSettings};
pub use debounce::Debouncer;
pub use editor::{ContactEditor, EditorMode};
pub use error::{GatewayError, GatewayErrorKind, GatewayResult};
pub use gateway::{ContactGateway, HttpContactGateway};
pub use list_controller::{ListController, ListEvent, ListView, QueryState};
pub use notice::{Notice, NoticeContext};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
