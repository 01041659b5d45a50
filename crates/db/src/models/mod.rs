//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches, validated with `validator`

pub mod league;
pub mod membership;
pub mod prompt;
pub mod response;
pub mod session;
pub mod standings;
pub mod status;
pub mod user;
pub mod vote;
