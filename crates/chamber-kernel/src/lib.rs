pub mod cleanup;
pub mod loft;
pub mod mock_kernel;
pub mod primitives;
pub mod step;
pub mod tessellation;
pub mod traits;
pub mod truck_kernel;
pub mod types;
mod wire;

pub use cleanup::{clean_mesh, CleanupReport};
pub use mock_kernel::MockKernel;
pub use traits::*;
pub use truck_kernel::TruckKernel;
pub use types::*;
