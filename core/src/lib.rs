pub mod fetch;
pub mod filter;
pub mod message;
pub mod notify;
pub mod poll;
