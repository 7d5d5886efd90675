use axum::http::header;
use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../../static/index.html");
const SCRIPT_JS: &str = include_str!("../../../static/script.js");

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}
