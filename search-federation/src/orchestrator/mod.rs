//! Search orchestrator: concurrent fan-out, fan-in, fold.
//!
//! [`fanout`] dispatches one task per provider under nested deadlines and
//! collects their outcomes; [`aggregate`] folds the collected outcomes into
//! a single response without re-ranking.

pub mod aggregate;
pub mod fanout;

pub use aggregate::fold;
pub use fanout::Orchestrator;
