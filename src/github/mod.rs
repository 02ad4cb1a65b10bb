pub mod client;
pub mod event;
pub mod pull_request;
