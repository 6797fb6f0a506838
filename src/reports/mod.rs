//! Aggregators over search results
//!
//! Each report has a strict `try_*` form returning `Result<_, QueryError>` and
//! a lenient form that logs the failure and degrades to `false`, an empty
//! list or `None`. Pick the lenient form only when the caller has nothing
//! better to do with the error.

pub mod campaigns;
pub mod performance;
pub mod probe;

pub use campaigns::{
    list_campaigns, try_list_campaigns, AdvertisingChannelType, Campaign, CampaignStatus,
};
pub use performance::{
    summarize_performance, try_summarize_performance, try_summarize_range, MetricsAccumulator,
    MetricsSummary, DEFAULT_DAYS_BACK,
};
pub use probe::{probe_connection, try_probe_connection, ProbeOutcome};
