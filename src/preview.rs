//! PNG thumbnails of pages, rendered by replaying their action logs.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::drawing::{Canvas, Page};
use crate::error::WhiteboardError;
use crate::room::{RoomId, RoomRegistry};
use crate::AppState;

pub const MAX_PREVIEW_SIZE: u32 = 1024;

#[derive(Debug, Default, Deserialize)]
pub struct PreviewParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// `GET /rooms/:room_id/pages/:page_id/preview.png`
pub async fn page_preview(
    Path((room_id, page_id)): Path<(String, usize)>,
    Query(params): Query<PreviewParams>,
    State(state): State<AppState>,
) -> Response {
    let config = &state.config;
    let width = params
        .width
        .unwrap_or(config.preview_width)
        .clamp(1, MAX_PREVIEW_SIZE);
    let height = params
        .height
        .unwrap_or(config.preview_height)
        .clamp(1, MAX_PREVIEW_SIZE);

    // Copy the page out so rendering does not hold up the gateway.
    let page = {
        let gateway = state.gateway.read().await;
        find_page(gateway.registry(), &room_id, page_id)
    };
    let Some(page) = page else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match render_preview(
        &page,
        (config.canvas_width, config.canvas_height),
        (width, height),
    ) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => {
            tracing::warn!("Preview of room {} page {} failed: {}", room_id, page_id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn find_page(registry: &RoomRegistry, room_id: &str, page_id: usize) -> Option<Page> {
    let room_id = RoomId::parse(room_id).ok()?;
    registry.get(&room_id)?.page(page_id).cloned()
}

/// Replay `page`, drawn on a `logical` surface, into a `size` thumbnail.
pub fn render_preview(
    page: &Page,
    logical: (u32, u32),
    size: (u32, u32),
) -> Result<Vec<u8>, WhiteboardError> {
    let mut canvas = Canvas::new(size.0, size.1)?;
    canvas.replay_scaled(page, logical.0, logical.1);
    canvas.to_png()
}
