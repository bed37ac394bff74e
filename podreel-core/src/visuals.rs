pub mod inventory;
pub mod resolve;
pub mod topics;
