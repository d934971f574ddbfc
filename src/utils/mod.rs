pub mod phone;
pub mod reference;

pub use phone::*;
pub use reference::*;
