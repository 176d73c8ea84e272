//! Skirmish Protocol - wire types shared by the engine and its clients
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - only serde and uuid
//! 2. **No business logic** - pure data types and serialization
//! 3. **No domain IDs** - raw `uuid::Uuid` in DTOs

pub mod messages;
pub mod requests;
pub mod responses;

pub use messages::StreamMessage;
pub use requests::{CreatePveBattleRequest, CreatePvpBattleRequest, SubmitCommandRequest};
pub use responses::{
    BatchResult, BattleKindData, BattleStatusData, BattleView, CombatantView, ErrorResponse,
    HealthResponse, OutcomeData, SideData, TurnView,
};
