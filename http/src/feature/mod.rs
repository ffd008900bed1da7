pub mod file_server;
pub mod isolation;
pub mod listing;
pub mod mime;

pub use file_server::StaticFiles;
pub use isolation::{CROSS_ORIGIN_ISOLATION_HEADERS, cross_origin_isolation};
