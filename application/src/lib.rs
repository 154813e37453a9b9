//! Application layer for cowrite
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod input_gate;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BehaviorConfig, CancelPolicy};
pub use input_gate::{InputGate, InputLock};
pub use ports::{
    change_reviewer::{ChangeReviewer, ReviewError},
    chat_store::ChatStore,
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    document_store::{DocumentStore, DocumentStoreError},
    llm_gateway::{GatewayError, LlmGateway, STREAM_INCOMPLETE, StreamHandle},
    progress::{CollaborationProgress, NoProgress},
};
pub use use_cases::ask::{AskError, AskInput, AskUseCase};
pub use use_cases::classify_request::ClassifyRequestUseCase;
pub use use_cases::coordinator::{
    CANCELLED_NOTICE, CollaborationCoordinator, CoordinatorError, DelegationResult,
    InterceptOutcome, NO_CHANGES_NOTICE, NO_UNIFIED_CHANGE_NOTICE,
};
pub use use_cases::direct_edit::{DirectEditInput, DirectEditOutcome, DirectEditUseCase};
pub use use_cases::reconcile::{ReconcileUseCase, ReconciliationOutcome};
pub use use_cases::run_collaboration::{
    CollaborationInput, CollaborationOutcome, CollaborationRun, RunCollaborationUseCase,
    TurnOutcome, TurnRecord,
};
