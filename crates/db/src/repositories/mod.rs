//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Plain reads and single-statement writes accept `&PgPool`; steps that must
//! run inside a caller's transaction accept `&mut PgConnection`
//! (pass `&mut *tx`).

pub mod league_repo;
pub mod membership_repo;
pub mod prompt_repo;
pub mod response_repo;
pub mod session_repo;
pub mod user_repo;
pub mod vote_repo;

pub use league_repo::LeagueRepo;
pub use membership_repo::MembershipRepo;
pub use prompt_repo::PromptRepo;
pub use response_repo::ResponseRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use vote_repo::VoteRepo;
