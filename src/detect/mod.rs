pub mod condition;
pub mod detector;
pub mod matcher;
pub mod prober;

pub use condition::evaluate;
pub use detector::{present_names, TechnologyDetector, TechnologyResult};
pub use matcher::matches;
pub use prober::RuleProber;
