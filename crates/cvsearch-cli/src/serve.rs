//! HTTP server for the search page.
//!
//! One page at `/` (the whole search state travels in the query string)
//! plus `/healthz`. Each request builds a fresh driver from the URL state,
//! runs it against the shared connector, and renders the result; nothing
//! is held between requests.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use cvsearch_core::{Error, Settings};
use cvsearch_driver::SearchDriver;
use cvsearch_es::{ElasticsearchConnector, FacetFilter};

use crate::page::{self, PageQuery};

/// Shared server state: the connector and page defaults.
struct AppState {
    connector: ElasticsearchConnector,
    page_size: usize,
}

/// Build the driver for one request's URL state.
fn driver_for(state: &AppState, query: &PageQuery) -> SearchDriver {
    let mut driver = SearchDriver::new(Box::new(state.connector.clone()), state.page_size);

    if let Some(term) = &query.q {
        driver.set_search_term(term.clone());
    }
    if let Some(gender) = &query.gender {
        driver.add_filter(FacetFilter::term("gender", gender.clone()));
    }
    if let Some(age) = &query.age {
        driver.add_filter(FacetFilter::bucket("age", age.clone()));
    }
    if let Some(accent) = &query.accent {
        driver.add_filter(FacetFilter::term("accent", accent.clone()));
    }
    if let Some(current_page) = query.page {
        driver.set_page(current_page);
    }

    driver
}

async fn search_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let mut driver = driver_for(&state, &query);

    match driver.run().await {
        Ok(_) => {
            let html = page::render_html(driver.state(), driver.paging_info(), &query);
            Html(html).into_response()
        }
        Err(err @ (Error::FacetNotFound { .. } | Error::BucketNotFound { .. })) => {
            (StatusCode::BAD_REQUEST, Html(page::render_error(&err.to_string()))).into_response()
        }
        Err(err) => {
            tracing::error!("Search failed: {err}");
            (StatusCode::BAD_GATEWAY, Html(page::render_error(&err.to_string()))).into_response()
        }
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.connector.client().ping().await {
        Ok(()) => Json(serde_json::json!({
            "status": "ok",
            "index": state.connector.client().index(),
        }))
        .into_response(),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unavailable",
                "error": err.to_string(),
            })),
        )
            .into_response(),
    }
}

/// Serve the search page until interrupted.
pub async fn run(settings: Settings, bind: &str) -> Result<()> {
    let connector = ElasticsearchConnector::new(&settings.elasticsearch)?;
    let state = Arc::new(AppState {
        connector,
        page_size: settings.page.size,
    });

    let app = Router::new()
        .route("/", get(search_page))
        .route("/healthz", get(healthz))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Serving search page on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
