pub mod manager;
pub mod traits;
pub mod types;

pub use manager::{connect, connect_with_clock};
pub use traits::ParkingBackend;
pub use types::BackendKind;
