pub mod assign;
pub mod evaluator;
pub mod ingest;
pub mod log;
pub mod overlap;
pub mod reconcile;
pub mod slots;
pub mod store;
pub mod sweep;
