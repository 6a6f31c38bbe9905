//! Library core: resolver, ordered membership ledger and unit of work

pub mod ledger;
pub mod resolver;
pub mod session;
pub mod staging;

pub use ledger::Ledger;
pub use resolver::{
    find_or_create, ArtistKey, EntityKind, IdentityCache, MemberKey, TagKey, TrackKey,
    TracklistKey, UniqueEntity,
};
pub use session::{CommitSummary, UnitOfWork};
pub use staging::Staged;
