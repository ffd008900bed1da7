#![forbid(unsafe_code)]

pub mod body;
pub mod connect;
pub mod error;
pub mod feature;
pub mod handler;
pub mod headers;
pub mod method;
pub mod request;
pub mod response;
pub mod server;
pub mod service;
pub mod uri;
pub mod utils;
pub mod version;
