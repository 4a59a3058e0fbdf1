use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Embed frontend static files (compile-time embed from ./frontend) / 嵌入前端静态文件
#[derive(RustEmbed)]
#[folder = "frontend"]
struct FrontendAssets;

/// Handle embedded static file requests / 处理嵌入的静态文件请求
pub async fn serve_embedded_file(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // Try to get requested file / 尝试获取请求的文件
    if let Some(content) = FrontendAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            [(header::CONTENT_TYPE, mime.as_ref().to_string())],
            content.data.into_owned(),
        )
            .into_response();
    }

    // If directory or file not found, return index.html (SPA routing support) / 目录或文件不存在时返回index.html
    if let Some(content) = FrontendAssets::get("index.html") {
        return (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8".to_string())],
            content.data.into_owned(),
        )
            .into_response();
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
