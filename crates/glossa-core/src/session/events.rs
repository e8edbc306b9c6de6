//! Event protocol between the core and its consumers.
//!
//! Exactly four event kinds cross the core/UI boundary: assistant fragments,
//! tool call records, interrupts, and session-level error strings. Transport
//! layers map these to their own presentation format.

use serde::Serialize;

use crate::interrupt::Interrupt;
use crate::tools::ToolCallRecord;

/// Events emitted by a running execution session, in graph order.
///
/// Fragments of one assistant message arrive in generation order and are
/// concatenated by the consumer. If a turn ends suspended, the interrupt is
/// the final event of the sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Incremental assistant-message fragment.
    Assistant { delta: String },

    /// A tool is about to execute; carries its display descriptions.
    Tool(ToolCallRecord),

    /// Execution paused pending a human decision. Always last in its turn.
    Interrupt(Interrupt),

    /// User-facing error message; the session has reset to accept input.
    Error { message: String },
}
