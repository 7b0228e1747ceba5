//! The call model: the normalized `Call`, its factories, candidate
//! collection and the per-program call table.

pub mod call;
pub use call::{Call, CallData, CallOverrides, CallType, DelegatingCall, Receiver, ValueArgument};

pub mod call_maker;
pub use call_maker::{CallMaker, operator_convention};

pub mod candidates;
pub use candidates::{ArgumentShape, Candidate, CandidateCollector, CandidateGroup, CandidateSource};

pub mod collector;
pub use collector::{CallCollector, CollectedCalls};
