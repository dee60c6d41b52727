pub mod client;
pub mod poller;

pub use client::WikiClient;
