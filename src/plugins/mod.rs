//! Reference plugins shipped with the crate.
//!
//! They compute nothing scientific; they exist so both processor variants
//! can be run end to end without third-party plugins.

pub mod observation_count;
pub mod variable_mean;

pub use observation_count::ObservationCountFactory;
pub use variable_mean::VariableMeanFactory;

use crate::registry::Registry;

pub const OBSERVATION_COUNT: &str = "ObservationCount";
pub const VARIABLE_MEAN: &str = "VariableMean";

pub fn register_builtin(registry: &mut Registry) {
    registry.register(Box::new(ObservationCountFactory::default()));
    registry.register(Box::new(VariableMeanFactory));
}

/// The requested indicators, or all declared ones when none were requested.
fn bound_indicators(requested: &[String], declared: &str) -> Vec<String> {
    if requested.is_empty() {
        vec![declared.to_string()]
    } else {
        requested
            .iter()
            .filter(|name| name.as_str() == declared)
            .cloned()
            .collect()
    }
}
