//! HTTP protocol layer module
//!
//! Response builders shared by the admin endpoints, static serving and
//! mock fulfilment.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_204_response, build_404_response, build_405_response, build_413_response,
    build_error_response, build_file_response, build_json_response, build_json_text_response,
};
