//! Parametric chamber models. Each model turns a set of named, unit-carrying
//! parameters into named solids built through a [`chamber_kernel::Kernel`].

pub mod buttons;
pub mod gallery;
pub mod pillbox;
pub mod registry;
pub mod simple;
pub mod striplines;
pub mod tapers;
pub mod types;

pub use registry::{all_models, find_model};
pub use types::{Model, ModelError, Sweep};
