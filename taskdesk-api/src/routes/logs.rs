/// Activity log endpoint
///
/// `GET /api/logs?page=N` returns one page of the audit trail, newest
/// first, to admins only. Pages are 1-based; a missing or non-positive page
/// reads as the first.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    auth::{authorization::authorize_activity_log, middleware::AuthContext},
    models::activity_log::{ActivityLog, ActivityLogEntry, PAGE_SIZE},
};

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub page: Option<i64>,
}

impl LogsQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Serialize)]
pub struct LogsPage {
    pub data: Vec<ActivityLogEntry>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

pub async fn list_logs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> ApiResult<Json<LogsPage>> {
    authorize_activity_log(&auth.actor)?;

    let Query(query) = query?;
    let page = query.page();

    let data = ActivityLog::list_page(&state.db, page).await?;
    let total = ActivityLog::count(&state.db).await?;

    Ok(Json(LogsPage {
        data,
        page,
        per_page: PAGE_SIZE,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamps() {
        assert_eq!(LogsQuery::default().page(), 1);
        assert_eq!(LogsQuery { page: Some(0) }.page(), 1);
        assert_eq!(LogsQuery { page: Some(-3) }.page(), 1);
        assert_eq!(LogsQuery { page: Some(4) }.page(), 4);
    }
}
