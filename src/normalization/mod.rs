//! Normalization and differencing of IP and control signal

mod counts;
mod diff;

pub use counts::normalize;
pub use diff::{diff, diff_with, nice_log, DiffTransform};
