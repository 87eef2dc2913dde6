pub use crate::error::Error;

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, Result, WrapErr};
pub use log::{debug, info, warn};
pub use std::format as f;
