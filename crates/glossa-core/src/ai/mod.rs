//! Model gateway and provider communication.
//!
//! - `types` - wire-adjacent message/tool types
//! - `providers` - provider ids and the builtin endpoint table
//! - `client` - `ModelTransport` trait and the HTTP implementation
//! - `gateway` - timeout + ordered multi-model fallback

pub mod client;
pub mod gateway;
pub mod providers;
pub mod types;

pub use client::{HttpTransport, ModelTransport};
pub use gateway::ModelGateway;
pub use providers::{ApiFormat, AuthHeader, ModelConfig, ProviderId};
pub use types::{AiTool, AiToolCall, Content, Message, Role};
