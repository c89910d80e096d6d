mod interest;
mod service;

pub use interest::{merge, FieldUpdate, InterestPatch, InterestSet};
pub use service::{
    BatchOutcome, EntryFailure, InterestUpdate, NewInterest, SubscriptionError,
    SubscriptionService, SubscriptionView,
};
