pub mod signature;

pub use signature::{
    SignatureError, SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
