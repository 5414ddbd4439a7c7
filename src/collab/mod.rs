pub mod api;
pub mod device;

pub use api::{ApiClient, MockApi};
pub use device::{Device, DeviceError, FileDevice};
