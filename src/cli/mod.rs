pub mod outbox;
pub mod triage;
