//! Client-side state that sits in front of the HTTP API: the session cache kept
//! in device storage, the dashboard route guard, and the voice features.
//!
//! Device capabilities (storage, speech) are reached through traits so that the
//! logic here can run against browser bindings or test fakes alike.

pub mod session;
pub mod speech;
pub mod storage;

pub use session::{ClientSession, RouteDecision};
pub use speech::{ReadAloud, SpeechError, SpeechRecognizer, SpeechSynthesizer, VoiceInput};
pub use storage::{KeyValueStorage, MemoryStorage};
