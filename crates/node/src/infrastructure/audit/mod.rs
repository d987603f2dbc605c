mod file_sink;
mod memory_sink;
mod noop;

pub use file_sink::FileAuditSink;
pub use memory_sink::InMemoryAuditSink;
pub use noop::NoopAuditSink;
