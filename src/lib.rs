pub mod catalog;
pub mod config;
pub mod detect;
pub mod hosts;
pub mod http_client;
pub mod output;
pub mod probe;
pub mod scan;
pub mod utils;
pub mod verify;

// re-export the engine surface used by the binary and tests
pub use crate::catalog::{Condition, EndpointCatalog, ExpectedResponse, Rule, RuleRequest, TechnologyCatalog, TechnologyDefinition};
pub use crate::detect::{TechnologyDetector, TechnologyResult};
pub use crate::scan::{HostReport, Scanner};
pub use crate::verify::{EndpointVerdict, EndpointVerifier};
