pub mod activity;
pub mod client;
pub mod completion;
