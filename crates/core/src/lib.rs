#![forbid(unsafe_code)]

pub mod model;
pub mod policy;
pub mod session;
pub mod time;

pub use time::Clock;
