pub mod service_secret;

pub use service_secret::{constant_time_equal, ServiceSecret};
