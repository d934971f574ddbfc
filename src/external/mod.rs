pub mod mailer;
pub mod payment_gateway;

pub use mailer::*;
pub use payment_gateway::*;
