//! Admin-only user management: statistics, search, detail, role changes and
//! deletion.

pub mod client;
pub mod types;

pub use types::{AdminUserDetail, AdminUserSummary, UserSearchFilters, UserSearchResult, UserStats};
