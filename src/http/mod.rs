//! HTTP protocol layer module
//!
//! Content type inference, validators and response builders shared by the
//! static file handler and the terminal handlers.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    build_304_response, build_404_response, build_405_response, build_500_response,
    build_file_response, FileHeaders,
};
