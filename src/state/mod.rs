pub mod containers;
pub mod information_state;

pub use containers::{OpenStack, Queue, Set, Stack};
pub use information_state::{
    AgendaItem, GroundingStatus, InformationState, LatestUtterance, Private, SessionPhase, Shared,
    TaggedMove,
};
