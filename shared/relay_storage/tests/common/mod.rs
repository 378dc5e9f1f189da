// Not every helper is used in every test binary
#![allow(unused_imports, dead_code)]

mod queue_utils;
mod secrets_utils;
pub use queue_utils::*;
pub use secrets_utils::*;
