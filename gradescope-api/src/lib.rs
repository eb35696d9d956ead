pub mod assignment;
pub mod assignment_selector;
pub mod client;
pub mod course;
pub mod creds;
pub mod date;
pub mod error;
pub mod extension;
pub mod props;
pub mod student;
pub mod token;
pub mod transport;

mod util;

pub use error::{Error, Result};
