pub mod api;
pub mod config;
pub mod demo_feed;
pub mod error;
pub mod expansion;
pub mod fetch;
pub mod grouping;
pub mod http_client;
pub mod links;
pub mod state;
pub mod window;
