//! tally-ingest: statement ingestion (CSV reading, layout detection) and the
//! record normalizer.

pub mod columns;
pub mod layout;
pub mod normalize;
pub mod parsers;
pub mod reader;
pub mod types;

pub use columns::{AmountColumns, ColumnMap};
pub use layout::{Layout, detect_layout};
pub use normalize::normalize;
pub use reader::{parse_csv_text, read_csv};
pub use types::{
    ErrorPolicy, NormalizeOptions, Normalized, RawRow, RowDiagnostic, SignConvention, SourceInput,
};
