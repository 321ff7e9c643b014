pub mod compiler;
pub mod description;
pub mod error;
pub mod font;
pub mod geometry;
pub mod manifest;
pub mod package;
pub mod palette;
pub mod placement;
pub mod sprite;
pub mod thumbnail;

pub use compiler::{CompiledObject, build_scenery, compile};
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
