pub mod errors;
pub mod params;
pub mod profile;
pub mod quantity;

pub use errors::*;
pub use params::*;
pub use profile::*;
pub use quantity::*;
