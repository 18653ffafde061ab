pub mod throttle;
pub mod transport;

#[cfg(test)]
pub mod stub;

pub use throttle::{Throttle, ThrottlePermit};
pub use transport::{HttpTransport, ProbeRequest, ProbeResponse, Transport};
