//! FSRS spaced-repetition scheduling for flashcards.
//!
//! [`Scheduler`] turns a card's [`CardMemoryState`] and a [`Grade`] into the
//! next memory state plus a [`ReviewLog`] entry. It performs no I/O; the
//! [`CardStore`] and [`Clock`] traits describe what a caller provides, and
//! [`ReviewService`] wires the three together.

pub mod card;
pub mod clock;
pub mod data;
pub mod error;
pub mod fsrs;
pub mod fuzz;
pub mod id;
pub mod logging;
pub mod params;
pub mod review_log;
pub mod scheduler;
pub mod service;
pub mod store;

pub use card::{CardMemoryState, State};
pub use clock::{Clock, FixedClock, SystemClock};
pub use data::JsonFileStore;
pub use error::{ConfigurationError, Error, StoreError, ValidationError};
pub use fsrs::{Grade, MemoryState, retrievability};
pub use id::CardId;
pub use params::{ParameterConfig, ParameterSet};
pub use review_log::ReviewLog;
pub use scheduler::{ScheduledReview, Scheduler};
pub use service::ReviewService;
pub use store::{CardStore, InMemoryStore};
