pub mod filter;
pub mod histogram;
pub mod poll_timer;
pub mod source;
pub mod table;
pub mod time_range;

pub use filter::{Filter, FilterError, FilterOperator, FilterSet};
pub use histogram::{HistogramColor, HistogramDatum};
pub use poll_timer::PollTimer;
pub use source::{Namespace, Source};
pub use table::{ColumnSpec, Row, TablePage};
pub use time_range::{TableTime, TimePeriod, TimeRange};
