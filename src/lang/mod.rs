/*!
# Rust Language Module

This Rust module holds what the machine loads rather than runs: the error
type shared by every machine operation and the reader for assembled IL
listings.

*/

#[macro_use]
mod error;
pub mod il;

pub use error::Error;
pub use error::ErrorCode;
