//! Read pipelines over the document collections: hierarchy views and vote
//! tallies. Pure functions over materialized snapshots; nothing in here
//! talks to the store or depends on its query language.

pub mod hierarchy;
pub mod tally;
