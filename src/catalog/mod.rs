pub mod endpoints;
pub mod loader;
pub mod technology;

pub use endpoints::{load_endpoint_catalog, parse_endpoint_list, EndpointCatalog};
pub use loader::{load_catalog, parse_technology};
pub use technology::{
    BodyPattern, Condition, ExpectedResponse, Rule, RuleRequest, TechnologyCatalog, TechnologyDefinition,
};
