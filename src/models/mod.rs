pub mod common;
pub mod group_order;
pub mod pagination;
pub mod participant;
pub mod payment_link;
pub mod price_tier;

pub use common::*;
pub use group_order::*;
pub use pagination::*;
pub use participant::*;
pub use payment_link::*;
pub use price_tier::*;
