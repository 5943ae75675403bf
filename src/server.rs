//! HTTP surface of the dashboard.
//!
//! Every request carries the full selection, so the server holds no
//! per-session state; the only shared value is the read-only context.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::chart::{ChartSpec, SUCCESS_PAYLOAD_SCATTER_CHART, SUCCESS_PIE_CHART};
use crate::config::SliderSettings;
use crate::context::{DashboardContext, DropdownOption};
use crate::data::filter::{PayloadRange, SiteSelection};
use crate::data::model::PayloadBounds;
use crate::state::{
    render_all, render_pie, render_scatter, DashboardCharts, SelectionState, PAYLOAD_SLIDER,
    SITE_DROPDOWN,
};

const INDEX_HTML: &str = include_str!("../assets/index.html");

pub type SharedContext = Arc<DashboardContext>;

#[derive(Debug, Deserialize)]
pub struct PieQuery {
    #[serde(default)]
    pub site: SiteSelection,
}

#[derive(Debug, Deserialize)]
pub struct ScatterQuery {
    #[serde(default)]
    pub site: SiteSelection,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DropdownLayout {
    pub id: &'static str,
    pub options: Vec<DropdownOption>,
    pub value: SiteSelection,
}

#[derive(Debug, Serialize)]
pub struct SliderLayout {
    pub id: &'static str,
    #[serde(flatten)]
    pub settings: SliderSettings,
    pub marks: Vec<f64>,
    pub value: PayloadRange,
}

/// Everything the page needs to build its controls.
#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub title: &'static str,
    pub dropdown: DropdownLayout,
    pub slider: SliderLayout,
    pub payload_bounds: Option<PayloadBounds>,
    pub charts: [&'static str; 2],
}

pub fn build_router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/layout", get(layout))
        .route("/api/charts/success-pie-chart", get(pie_chart))
        .route("/api/charts/success-payload-scatter-chart", get(scatter_chart))
        .route("/api/update", post(update))
        .with_state(ctx)
}

async fn index() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Html(INDEX_HTML),
    )
}

async fn healthz() -> &'static str {
    "ok"
}

async fn layout(State(ctx): State<SharedContext>) -> Json<LayoutResponse> {
    let defaults = ctx.default_selection();
    let slider = *ctx.slider();
    Json(LayoutResponse {
        title: "SpaceX Launch Records Dashboard",
        dropdown: DropdownLayout {
            id: SITE_DROPDOWN,
            options: ctx.dropdown_options(),
            value: defaults.site,
        },
        slider: SliderLayout {
            id: PAYLOAD_SLIDER,
            settings: slider,
            marks: slider.marks(),
            value: defaults.payload_range,
        },
        payload_bounds: ctx.payload_bounds(),
        charts: [SUCCESS_PIE_CHART, SUCCESS_PAYLOAD_SCATTER_CHART],
    })
}

async fn pie_chart(
    State(ctx): State<SharedContext>,
    Query(query): Query<PieQuery>,
) -> Json<ChartSpec> {
    log::debug!("pie chart for site {}", query.site);
    Json(ChartSpec::Pie(render_pie(&ctx, &query.site)))
}

async fn scatter_chart(
    State(ctx): State<SharedContext>,
    Query(query): Query<ScatterQuery>,
) -> Json<ChartSpec> {
    let full = ctx.full_payload_range();
    let selection = SelectionState {
        site: query.site,
        payload_range: PayloadRange::new(
            query.low.unwrap_or(full.low),
            query.high.unwrap_or(full.high),
        ),
    };
    log::debug!("scatter chart for {selection:?}");
    Json(ChartSpec::Scatter(render_scatter(&ctx, &selection)))
}

async fn update(
    State(ctx): State<SharedContext>,
    Json(selection): Json<SelectionState>,
) -> Json<DashboardCharts> {
    log::debug!("update for {selection:?}");
    Json(render_all(&ctx, &selection))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::data::model::{record, LaunchDataset, OutcomeClass::*};

    fn test_app() -> Router {
        let ctx = DashboardContext::new(
            LaunchDataset::from_records(vec![
                record("A", 500.0, Success, "v1.0"),
                record("A", 1500.0, Failure, "v1.1"),
                record("B", 800.0, Success, "FT"),
            ]),
            &SliderSettings::default(),
        );
        build_router(Arc::new(ctx))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let request = Request::get("/healthz").body(Body::empty()).expect("request");
        let response = test_app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(body.as_ref(), b"ok");
    }

    #[tokio::test]
    async fn index_serves_dashboard_page() {
        let request = Request::get("/").body(Body::empty()).expect("request");
        let response = test_app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let page = String::from_utf8_lossy(&body);
        assert!(page.contains("SpaceX Launch Records Dashboard"));
        assert!(page.contains("site-dropdown"));
    }

    #[test]
    fn page_sends_the_held_range_not_the_snapped_inputs() {
        let start = INDEX_HTML.find("function selection()").expect("selection()");
        let body = &INDEX_HTML[start..];
        let body = &body[..body.find("\n    }").expect("end of selection()")];
        assert!(body.contains("currentRange"));
        assert!(!body.contains("low.value") && !body.contains("high.value"));

        // declared, seeded from the exact layout value, reassigned by the slider handler
        assert!(INDEX_HTML.contains("currentRange = { ...layout.slider.value }"));
        assert_eq!(INDEX_HTML.matches("currentRange = ").count(), 3);
        assert!(INDEX_HTML.contains(r#"input.addEventListener("change", sliderMoved)"#));
    }

    #[tokio::test]
    async fn layout_describes_controls() {
        let (status, json) = get_json(test_app(), "/api/layout").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["dropdown"]["id"], "site-dropdown");
        assert_eq!(json["dropdown"]["value"], "ALL");
        assert_eq!(json["dropdown"]["options"][0]["label"], "All Sites");
        assert_eq!(json["dropdown"]["options"].as_array().unwrap().len(), 3);
        assert_eq!(json["slider"]["min"], 0.0);
        assert_eq!(json["slider"]["max"], 10000.0);
        assert_eq!(json["slider"]["step"], 1000.0);
        assert_eq!(json["slider"]["value"]["low"], 500.0);
        assert_eq!(json["slider"]["value"]["high"], 1500.0);
    }

    #[tokio::test]
    async fn pie_defaults_to_all_sites() {
        let (status, json) = get_json(test_app(), "/api/charts/success-pie-chart").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "pie");
        assert_eq!(json["title"], "Total Success Launches by Site");
        assert_eq!(json["slices"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn pie_for_unknown_site_is_empty_not_an_error() {
        let (status, json) = get_json(test_app(), "/api/charts/success-pie-chart?site=Z").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["slices"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn scatter_honours_site_and_range() {
        let (status, json) = get_json(
            test_app(),
            "/api/charts/success-payload-scatter-chart?site=ALL&low=0&high=1000",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let total: usize = json["series"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["points"].as_array().unwrap().len())
            .sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn scatter_rejects_non_numeric_bounds() {
        let (status, _) = get_json(
            test_app(),
            "/api/charts/success-payload-scatter-chart?low=abc",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_returns_both_charts() {
        let request = Request::post("/api/update")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "site": "A",
                    "payload_range": {"low": 0.0, "high": 10000.0}
                })
                .to_string(),
            ))
            .expect("request");
        let response = test_app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: Value = serde_json::from_slice(&body).expect("json");

        assert_eq!(json["pie"]["title"], "Total Success vs Failed Launches for site A");
        assert_eq!(json["scatter"]["title"], "Correlation between Payload and Success for site A");
    }
}
