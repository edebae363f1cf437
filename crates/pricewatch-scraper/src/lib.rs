pub mod adapters;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod number;
pub mod outcome;
pub mod page;
mod rate_limit;
pub mod recorder;
pub mod transport;
pub mod types;

pub use adapters::{
    default_adapters, FetchSettings, GenericSelectorAdapter, MarketplaceAdapter, SourceAdapter,
    SourceContext, StructuredPageAdapter, TimeSeriesAdapter,
};
pub use credentials::Credentials;
pub use engine::PriceExtractionEngine;
pub use error::{
    AdapterError, ErrorReason, ExtractionError, NumberParseError, RecordError, TransportBuildError,
};
pub use number::{parse_loose, parse_price};
pub use outcome::{ExtractionOutcome, RunSummary};
pub use page::{HtmlPageQuery, PageQuery};
pub use recorder::{CsvRecorder, MemoryRecorder, ObservationRecorder};
pub use transport::{FetchRequest, FetchStatus, HttpTransport, RawFetchResult, Transport};
