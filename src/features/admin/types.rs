//! Admin user-management views. Shapes follow the backend's camelCase JSON.

use crate::features::auth::types::Role;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Search filters; empty values are never sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSearchFilters {
    pub search_term: String,
    pub role: String,
    pub status: String,
    pub page: u32,
    pub limit: u32,
}

impl Default for UserSearchFilters {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            role: String::new(),
            status: String::new(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl UserSearchFilters {
    /// Query pairs for the non-empty filters, in a stable order.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        for (key, value) in [
            ("searchTerm", self.search_term.trim()),
            ("role", self.role.trim()),
            ("status", self.status.trim()),
        ] {
            if !value.is_empty() {
                query.push((key, value.to_string()));
            }
        }
        if self.page > 0 {
            query.push(("page", self.page.to_string()));
        }
        if self.limit > 0 {
            query.push(("limit", self.limit.to_string()));
        }
        query
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub admin_users: u64,
    #[serde(default)]
    pub regular_users: u64,
    #[serde(default)]
    pub active_sessions: u64,
    #[serde(default)]
    pub today_logins: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub active_sessions: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub users_per_page: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserSearchResult {
    #[serde(default)]
    pub users: Vec<AdminUserSummary>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoginEvent {
    pub timestamp: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActiveSessionSummary {
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub browser: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetail {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub login_history: Vec<LoginEvent>,
    #[serde(default)]
    pub active_sessions: Vec<ActiveSessionSummary>,
}

#[derive(Deserialize)]
pub(crate) struct UserDetailResponse {
    pub user: AdminUserDetail,
}

#[derive(Serialize)]
pub(crate) struct SetRoleRequest<'a> {
    pub role: &'a Role,
}
