//! Service info and the root redirect.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;

use crate::api::ApiState;
use crate::http::{response, RequestContext};

#[derive(Debug, Serialize)]
struct Info {
    uptime: String,
    info: &'static str,
    version: &'static str,
}

pub async fn get_info(state: Arc<ApiState>, _ctx: RequestContext) -> Response {
    let info = Info {
        uptime: uptime(state.started.elapsed()),
        info: "Service for Paragliding tracks.",
        version: "v1",
    };
    response::json(StatusCode::OK, &info)
}

/// ISO 8601 style duration using 28-day months and 365-day years.
pub fn uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let days = hours / 24;

    format!(
        "P{}Y{}M{}DT{}H{}M{}S",
        days / 365,
        (days / 28) % 12,
        days % 28,
        hours % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_format() {
        assert_eq!(uptime(Duration::ZERO), "P0Y0M0DT0H0M0S");
        assert_eq!(uptime(Duration::from_secs(3661)), "P0Y0M0DT1H1M1S");

        let thirty_days = Duration::from_secs(30 * 24 * 3600 + 5);
        assert_eq!(uptime(thirty_days), "P0Y1M2DT0H0M5S");

        let a_year = Duration::from_secs(366 * 24 * 3600);
        assert_eq!(uptime(a_year), "P1Y1M2DT0H0M0S");
    }
}
