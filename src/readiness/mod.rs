pub mod aggregator;
pub mod condition;

pub use aggregator::{Evaluation, ReadinessAggregator};
pub use condition::{
    Condition, ConditionStatus, MalformedCondition, REASON_AVAILABLE, REASON_CREATING,
    REASON_RECONCILE_ERROR, TYPE_NO_ERRORS, TYPE_READY,
};
