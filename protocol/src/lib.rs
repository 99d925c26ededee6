//! Types shared between the composer UI and the binaries that embed it.

pub mod models;
pub mod num_format;
pub mod user_input;
