pub mod customer;
pub mod envelope;

pub use customer::normalize_customer_id;
pub use envelope::{Account, AccountsEnvelope, QueryResultEnvelope, Row};
