//! Starmap Shared - wire contracts between the content service and clients
//!
//! Pure data types: the response envelope, query-string shapes and
//! response payloads. No I/O and no business rules beyond input parsing.

pub mod envelope;
pub mod requests;
pub mod responses;

pub use envelope::{ApiResponse, SOURCE_SQLITE};
pub use requests::{CharacterSearchQuery, EventSearchQuery, LayoutQuery, NetworkQuery};
pub use responses::{
    CharacterDto, CompleteData, EventCastLayout, EventDto, GalaxyLayout, HealthStatus,
    JourneyLayout, NetworkLayout, RecordMetadata, StatsDto, VisualDto,
};
