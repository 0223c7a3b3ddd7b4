//! I/O infrastructure: the observation log file format.

pub mod obslog;
