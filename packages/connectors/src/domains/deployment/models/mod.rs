pub mod asset;
pub mod platform;
pub mod result;

pub use asset::*;
pub use platform::*;
pub use result::*;
