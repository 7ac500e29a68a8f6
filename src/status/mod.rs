pub mod process;
pub mod render;

pub use process::*;
pub use render::*;
