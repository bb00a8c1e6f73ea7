mod error;
mod mutex;
#[cfg(test)]
mod tests;
mod worker;

pub use error::*;
pub use mutex::*;
pub use worker::*;
