mod init;
mod macros;
mod trace_id;

pub use init::init_logger;
pub use macros::{instance_span, symbol_span};
pub use trace_id::TraceId;
