mod event_source;
mod execution;
mod monitor;
mod oracle;
mod pair_filter;

pub use event_source::*;
pub use execution::*;
pub use monitor::*;
pub use oracle::*;
pub use pair_filter::*;
