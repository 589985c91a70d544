pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod search;
pub mod specs;

pub use error::ScrapeError;
pub use fetch::{Fetch, FetchStatus, Fetcher, RetrievalResult, StrategyKind};
pub use normalize::{NormalizedUrl, Normalizer};
pub use pipeline::{AnalysisResponse, Analyzer};
pub use search::SearchEndpoints;
