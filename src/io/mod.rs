pub mod export;
/// CSV readers for the two input tables.
pub mod import;
