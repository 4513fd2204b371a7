//! zordd — WebSocket vision backend.
//!
//! One long-lived socket per client. Camera frames come back as face
//! positions; `DESCRIBE:` commands come back as a remote scene description
//! plus the name of any known face in view.

pub mod app;
pub mod config;
pub mod describer;
pub mod engine;
pub mod protocol;
pub mod router;
pub mod session;

pub use app::{app, serve, AppState, VISION_PATH};
pub use config::Config;
pub use describer::{DescriptionResult, DescriptionService, GeminiClient, SceneDescriber};
pub use engine::{spawn_engine, EngineHandle};
pub use protocol::{Inbound, Outbound};
pub use router::MessageRouter;
