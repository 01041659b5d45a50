pub mod auth;
pub mod cycle;
pub mod leaderboard;
pub mod league;
pub mod prompt;
pub mod response;
pub mod vote;
