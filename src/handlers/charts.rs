use axum::extract::State;

use crate::{
    AppState,
    models::{MonthlyChart, SexChartEntry, Sex},
    response::{ApiResult, success},
};

/// sex_chart
///
/// [Admin Route] Live users per sex. Always three entries, in the order male, female, unknown,
/// with zero for an empty bucket.
#[utoipa::path(
    get,
    path = "/admin/charts/sex",
    responses((status = 200, description = "Users per sex", body = [SexChartEntry]))
)]
pub async fn sex_chart(State(state): State<AppState>) -> ApiResult<Vec<SexChartEntry>> {
    let counts = state.repo.count_users_by_sex().await?;
    let data = Sex::ALL
        .iter()
        .map(|sex| SexChartEntry {
            value: counts
                .iter()
                .find(|(s, _)| s == sex)
                .map(|(_, n)| *n)
                .unwrap_or(0),
            name: sex.label().to_string(),
        })
        .collect();
    success("查询用户性别成功。", data)
}

/// user_chart
///
/// [Admin Route] Live users per signup month, ascending.
#[utoipa::path(
    get,
    path = "/admin/charts/user",
    responses((status = 200, description = "Users per month", body = MonthlyChart))
)]
pub async fn user_chart(State(state): State<AppState>) -> ApiResult<MonthlyChart> {
    let (months, values): (Vec<String>, Vec<i64>) =
        state.repo.count_users_by_month().await?.into_iter().unzip();
    success("查询每月用户数量成功。", MonthlyChart { months, values })
}
