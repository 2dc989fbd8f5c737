pub mod errors;
pub mod finding;
pub mod probe;
pub mod request;

pub use errors::ClientError;
pub use finding::{ConformanceFinding, FindingKind};
pub use probe::{Probe, ProbeReport};
pub use request::{ApiRequest, ApiResponse};
