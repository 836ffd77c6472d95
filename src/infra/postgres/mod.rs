//! PostgreSQL store implementations.

mod ledger;
mod notifications;
mod submissions;

pub use ledger::PgPointsLedger;
pub use notifications::PgNotificationSink;
pub use submissions::PgSubmissionStore;
