//! Geometry building blocks for the chamber models: aperture outlines,
//! pipes and tapers, and reusable components.

pub mod apertures;
pub mod components;
pub mod elements;
pub mod types;

pub use apertures::*;
pub use components::*;
pub use elements::*;
pub use types::*;
