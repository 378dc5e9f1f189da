pub mod environment;
pub mod error;

pub use environment::Environment;
pub use error::AppError;
