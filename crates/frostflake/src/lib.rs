mod generator;
mod id;
mod time;

pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
