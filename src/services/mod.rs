pub mod group_order_service;
pub mod participant_service;
pub mod payment_link_service;

pub use group_order_service::*;
pub use participant_service::*;
pub use payment_link_service::*;
