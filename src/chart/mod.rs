/// Chart layer: request schema, aggregation and payload shapes.
///
/// ```text
///   ColumnViews + [ChartRequest]
///        │
///        ▼
///   ┌──────────┐
///   │ builder   │  one aggregate per request, bad requests skipped
///   └──────────┘
///        │
///        ▼
///   [NamedPayload]  artifact name → JSON-ready payload
/// ```

pub mod builder;
pub mod payload;
pub mod request;
pub mod stats;

pub use builder::{build, build_request, BuildOptions, ChartBatch, SkippedRequest};
pub use payload::{ChartPayload, NamedPayload};
pub use request::{parse_batch, parse_request, ChartRequest};
