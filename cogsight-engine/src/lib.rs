//! Analytical aggregation engine for restaurant sales and COGS dashboards.
//!
//! Transforms raw point-of-sale transaction exports into derived metrics:
//! profitability rankings, temporal patterns, COGS efficiency scoring,
//! heuristic optimization recommendations, and a bounded statistical digest
//! for an external AI analyst. The interactive UI, PDF rendering, and chat
//! protocol are external consumers of the structured outputs produced here.
//!
//! Data flow: `loader` produces a canonical [`Dataset`] once per upload;
//! `filter::apply` re-derives a filtered view on every parameter change;
//! everything in `aggregate`, `recommend`, and `summary` is a stateless
//! pure function over whatever filtered view is current.

pub mod aggregate;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod record;
pub mod recommend;
pub mod summary;
pub mod thresholds;
pub mod util;

pub use dataset::Dataset;
pub use error::{EngineError, EngineResult};
pub use filter::{BranchFilter, FilterSpec};
pub use record::SaleRecord;
pub use recommend::{Recommendation, RecommendConfig};
