pub mod errors;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{AppError, AppResult, DomainError, InfraError};
pub use shutdown::{listen_for_shutdown_signals, ShutdownSignal};
