//! Agent runtime - routing, specialist handlers, and suspend/resume
//!
//! This crate is the conversational brain of outfitter:
//! - Routes each inbound message to exactly one specialist (`router`)
//! - Runs the specialist against the catalog/order/market capabilities
//!   (`handlers`, `tools`)
//! - Pauses transactional runs for human confirmation and resumes them with
//!   the shopper's decision (`handlers::transactional`, `runtime`)
//! - Checkpoints session state around every turn (`runtime`)
//!
//! # Architecture
//!
//! A turn moves through a fixed state machine:
//! 1. **Load** session state from the checkpoint store
//! 2. **Resume** a pending suspension, or **route** a fresh message
//! 3. **Dispatch** to the selected specialist
//! 4. **Persist** the resulting state before anything is returned
//!
//! # Safety Principle
//!
//! The language capability is strictly a classifier and copywriter. It never
//! decides mandate amounts, never executes tools it was not bound, and every
//! one of its failures degrades to a well-formed response - a turn never
//! surfaces a raw capability error to the caller.

pub mod handlers;
pub mod intent;
pub mod llm;
pub mod market;
pub mod router;
pub mod runtime;
pub mod tools;

pub use llm::{LlmClient, LlmError, LlmReply, ToolCallRequest, ToolSchema};
pub use market::{MarketDataClient, MarketError};
pub use router::Router;
pub use runtime::{AgentRuntime, TurnOutcome, DEFAULT_BUYER_ID};
