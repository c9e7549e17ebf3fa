//! # quill-engine
//!
//! The conversational core: context loading, usage tracking, session
//! memory, prompt compilation, and the loop that drives them.
//!
//! Data flow for one instruction:
//!
//! ```text
//! SessionLoop ─▶ ResponseSink::frame ─▶ Session::generate
//!                                        ├─ PromptCompiler (memory + context, once)
//!                                        ├─ UsageTracker
//!                                        └─ GenerationClient
//!             ◀─ ResponseSink::deliver ◀─┘
//! ```

pub mod compiler;
pub mod context;
pub mod driver;
pub mod memory;
pub mod session;
pub mod sink;
pub mod usage;

pub use compiler::PromptCompiler;
pub use context::{ContextMap, ContextSource, FsContextLoader};
pub use driver::{LoopExit, SessionLoop};
pub use memory::{Exchange, SessionMemory};
pub use session::Session;
pub use sink::{
    ConsoleSink, DocumentSink, ResponseSink, CHAT_FAILURE_MESSAGE, DOCUMENT_PREAMBLE,
    FAILURE_MESSAGE,
};
pub use usage::{UsageSample, UsageSummary, UsageTracker};
