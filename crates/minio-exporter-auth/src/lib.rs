pub mod credentials;
pub mod signature_v4;

pub use credentials::Credentials;
pub use signature_v4::{EMPTY_PAYLOAD_SHA256, SignedHeaders, SigningParams, sign_request};
