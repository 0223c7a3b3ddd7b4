//! Radio propagation models.

pub mod path_loss;
