pub mod async_support;

pub use async_support::{poll_until, Clock, ManualClock, PollOutcome, PollPolicy, TokioClock};
