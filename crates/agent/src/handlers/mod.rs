//! Specialist handlers. Each consumes the conversation log and produces a
//! final [`outfitter_core::AgentResponse`] - except the transactional
//! specialist, whose first phase raises a suspension instead.

pub mod concierge;
pub mod researcher;
pub mod retention;
pub mod support;
pub mod tool_loop;
pub mod transactional;

pub use concierge::ConciergeHandler;
pub use researcher::ResearcherHandler;
pub use retention::RetentionHandler;
pub use support::SupportHandler;
pub use tool_loop::ToolLoopHandler;
pub use transactional::TransactionalHandler;
