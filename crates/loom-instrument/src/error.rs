use loom_model::ModelError;

pub type Result<T> = std::result::Result<T, InstrumentError>;

/// Errors raised while planning an instrumentation. None of them are retried: each is a
/// deterministic function of the type graph and the configured policies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstrumentError {
    #[error(
        "could not resolve bridge method {bridge} with multiple potential targets [{}]",
        .candidates.join(", ")
    )]
    AmbiguousBridgeTarget {
        bridge: String,
        candidates: Vec<String>,
    },

    #[error("could not resolve the target of bridge method {bridge}")]
    UnresolvedBridgeTarget { bridge: String },

    #[error("bridge resolution for {method} did not terminate within {steps} steps")]
    BridgeChainTooDeep { method: String, steps: usize },

    #[error("cannot {operation} an illegal special method invocation")]
    IllegalInvocation { operation: &'static str },

    #[error("abstract method {method} cannot be implemented")]
    AbstractMethod { method: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}
