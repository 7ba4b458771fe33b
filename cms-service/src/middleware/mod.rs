//! Tower layers applied to every request

pub mod error_envelope;
pub mod request_tracking;

pub use error_envelope::{envelope_layer_errors, panic_response};
pub use request_tracking::{
    request_id_layer, request_id_propagation_layer, sensitive_headers_layer, MakeUuidRequestId,
    SENSITIVE_HEADERS,
};
