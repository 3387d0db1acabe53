use std::sync::Arc;

use uuid::Uuid;

use outfitter_core::{
    AgentResponse, ApplicationError, Message, SessionId, SessionState, Specialist,
    SuspensionRequest,
};
use outfitter_db::{CatalogService, CheckpointStore, OrderService, StoreError};

use crate::handlers::{
    ConciergeHandler, ResearcherHandler, RetentionHandler, SupportHandler, TransactionalHandler,
};
use crate::llm::LlmClient;
use crate::market::MarketDataClient;
use crate::router::Router;

/// The storefront runs single-shopper demo sessions; this is the buyer every
/// mandate and order lookup is attributed to.
pub const DEFAULT_BUYER_ID: &str = "user_123";

/// What a turn hands back to the caller: either the specialist's final
/// response or the payload of a pending human confirmation.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    Final(AgentResponse),
    Suspended(SuspensionRequest),
}

/// Drives the per-turn state machine: load session state, resume a pending
/// suspension or route the fresh message, dispatch one specialist, and
/// persist the result before returning. One instance serves all sessions;
/// state lives only in the checkpoint store.
pub struct AgentRuntime {
    checkpoints: Arc<dyn CheckpointStore>,
    catalog: Arc<dyn CatalogService>,
    router: Router,
    concierge: ConciergeHandler,
    support: SupportHandler,
    researcher: ResearcherHandler,
    transactional: TransactionalHandler,
    retention: RetentionHandler,
    buyer_id: String,
}

impl AgentRuntime {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        checkpoints: Arc<dyn CheckpointStore>,
        catalog: Arc<dyn CatalogService>,
        orders: Arc<dyn OrderService>,
        market: Arc<dyn MarketDataClient>,
    ) -> Self {
        Self {
            router: Router::new(llm.clone()),
            concierge: ConciergeHandler::new(llm.clone(), catalog.clone(), orders.clone()),
            support: SupportHandler::new(llm.clone(), catalog.clone(), orders, DEFAULT_BUYER_ID),
            researcher: ResearcherHandler::new(llm, catalog.clone(), market),
            transactional: TransactionalHandler::new(),
            retention: RetentionHandler::new(),
            checkpoints,
            catalog,
            buyer_id: DEFAULT_BUYER_ID.to_string(),
        }
    }

    /// Run one turn. While a suspension is pending, the inbound text is the
    /// resume decision - whatever it says - and the router is bypassed.
    pub async fn submit(
        &self,
        session_id: &SessionId,
        user_text: &str,
    ) -> Result<TurnOutcome, ApplicationError> {
        let correlation_id = Uuid::new_v4().to_string();

        let mut state = self
            .checkpoints
            .load(session_id)
            .await
            .map_err(persistence)?
            .unwrap_or_else(|| SessionState::new(session_id.clone()));

        state.push_message(Message::user(user_text));

        let outcome = if let Some(suspension) = state.take_suspension() {
            tracing::info!(
                event_name = "agent.turn.resumed",
                correlation_id = %correlation_id,
                session_id = %session_id,
                specialist = suspension.raised_by.as_str(),
                "resuming suspended run with the inbound message as the decision"
            );
            let (mandate, response) = self.transactional.resolve(suspension.mandate, user_text)?;
            tracing::info!(
                event_name = "agent.mandate.resolved",
                correlation_id = %correlation_id,
                session_id = %session_id,
                mandate_id = %mandate.mandate_id.0,
                status = ?mandate.status(),
                "mandate reached a terminal state"
            );
            self.finish(&mut state, response)
        } else {
            let decision = self.router.route(state.messages()).await;
            state.pending_route = Some(decision.next_node);
            tracing::info!(
                event_name = "agent.turn.routed",
                correlation_id = %correlation_id,
                session_id = %session_id,
                specialist = decision.next_node.as_str(),
                "routed fresh turn"
            );

            match decision.next_node {
                Specialist::Concierge => {
                    let (transcript, response) = self.concierge.run(state.messages()).await;
                    self.append_transcript(&mut state, transcript);
                    self.finish(&mut state, response)
                }
                Specialist::Support => {
                    let (transcript, response) = self.support.run(state.messages()).await;
                    self.append_transcript(&mut state, transcript);
                    self.finish(&mut state, response)
                }
                Specialist::Researcher => {
                    let response = self.researcher.run(state.messages()).await;
                    self.finish(&mut state, response)
                }
                Specialist::Transactional => {
                    let products = self.catalog.search("", None).await;
                    let suspension =
                        self.transactional.propose(state.messages(), &products, &self.buyer_id);
                    state.begin_suspension(suspension.clone())?;
                    tracing::info!(
                        event_name = "agent.turn.suspended",
                        correlation_id = %correlation_id,
                        session_id = %session_id,
                        mandate_id = %suspension.mandate.mandate_id.0,
                        "halting for human confirmation"
                    );
                    TurnOutcome::Suspended(suspension)
                }
                Specialist::Retention => self.finish(&mut state, self.retention.run()),
            }
        };

        self.checkpoints.save(&state).await.map_err(persistence)?;
        Ok(outcome)
    }

    /// Reset a session's conversation while keeping its id. Idempotent; a
    /// session that was never seen simply gets an empty checkpoint.
    pub async fn clear(&self, session_id: &SessionId) -> Result<(), ApplicationError> {
        let mut state = self
            .checkpoints
            .load(session_id)
            .await
            .map_err(persistence)?
            .unwrap_or_else(|| SessionState::new(session_id.clone()));

        state.clear();
        self.checkpoints.save(&state).await.map_err(persistence)?;

        tracing::info!(
            event_name = "agent.session.cleared",
            session_id = %session_id,
            "session reset"
        );
        Ok(())
    }

    fn append_transcript(&self, state: &mut SessionState, transcript: Vec<Message>) {
        for message in transcript {
            state.push_message(message);
        }
    }

    fn finish(&self, state: &mut SessionState, response: AgentResponse) -> TurnOutcome {
        state.push_message(Message::agent(response.content()));
        state.final_response = Some(response.clone());
        TurnOutcome::Final(response)
    }
}

fn persistence(error: StoreError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}
