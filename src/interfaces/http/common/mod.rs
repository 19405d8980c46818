//! Building blocks shared by the HTTP modules

mod error;
mod response;
mod validated_json;

pub use error::ApiError;
pub use response::ApiResponse;
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};
