//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod logging;
mod refresher;
mod sendflow;
mod session;
mod transfer;

pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use refresher::{BalanceListener, BalanceRefresher};
pub use sendflow::{SendFlow, SendStep};
pub use session::{SessionService, StatusSummary};
pub use transfer::{SendReport, SendStatus, TransferService, TransferSettings};
