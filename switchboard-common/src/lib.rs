//! Switchboard Common Types
//!
//! Shared types used by the runner and by clients of the dispatch protocol.

pub mod params;
pub mod protocol;

pub use params::{render_signature, ParamKind, ParamSpec};
pub use protocol::{
    Action, DecodeError, DispatchRequest, DispatchResponse, ErrorResponse, FunctionSignature,
    InvokeResponse, ModelSummary, ModelsResponse,
};
