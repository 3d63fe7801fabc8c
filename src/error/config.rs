use thiserror::Error;

/// Rule registration failures.
///
/// These are programmer errors in rule data and fail fast at registration
/// time, before any scanning begins.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("rule in bundle '{bundle}' declares no target types")]
    EmptyTargetTypes { bundle: String },

    #[error(
        "rule in bundle '{bundle}' binds dependent rules to parameter {position} \
         but declares only {arity} parameters"
    )]
    DependentPositionOutOfRange {
        bundle: String,
        position: usize,
        arity: usize,
    },

    #[error("rule in bundle '{bundle}' has a wildcard before the end of its parameter pattern")]
    WildcardNotTerminal { bundle: String },

    #[error("value action in bundle '{bundle}' reads parameter {position}, outside the pattern")]
    ActionPositionOutOfRange { bundle: String, position: usize },
}

impl ConfigurationError {
    pub fn empty_target_types(bundle: impl Into<String>) -> Self {
        Self::EmptyTargetTypes {
            bundle: bundle.into(),
        }
    }

    pub fn dependent_position_out_of_range(
        bundle: impl Into<String>,
        position: usize,
        arity: usize,
    ) -> Self {
        Self::DependentPositionOutOfRange {
            bundle: bundle.into(),
            position,
            arity,
        }
    }

    pub fn wildcard_not_terminal(bundle: impl Into<String>) -> Self {
        Self::WildcardNotTerminal {
            bundle: bundle.into(),
        }
    }

    pub fn action_position_out_of_range(bundle: impl Into<String>, position: usize) -> Self {
        Self::ActionPositionOutOfRange {
            bundle: bundle.into(),
            position,
        }
    }
}
