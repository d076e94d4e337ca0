//! Drawing surfaces and the host container that owns them.

pub(crate) mod composite;
pub mod draw;
pub mod headless;
pub mod pixmap;
pub mod record;
pub mod sink;
