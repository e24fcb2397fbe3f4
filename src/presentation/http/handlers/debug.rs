//! Debug Page Handler
//!
//! Self-refreshing HTML view of a room's live presence.

use std::fmt::Write;

use axum::{
    extract::{Path, State},
    response::Html,
};
use chrono::{DateTime, Utc};

use super::room::room_service;
use crate::application::services::{RoomDetails, RoomService};
use crate::shared::error::AppError;
use crate::startup::AppState;

const REFRESH_MS: u32 = 2000;

const STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, sans-serif; padding: 20px; background: #1a1a1a; color: #fff; }
h1 { color: #4CAF50; }
.room-id { font-family: monospace; background: #333; padding: 10px; border-radius: 5px; font-size: 24px; }
.member { padding: 15px; margin: 10px 0; border-radius: 8px; background: #2a2a2a; display: flex; align-items: center; gap: 15px; }
.avatar { width: 50px; height: 50px; border-radius: 50%; background: #444; overflow: hidden; }
.avatar img { width: 100%; height: 100%; object-fit: cover; }
.badge { padding: 4px 12px; border-radius: 20px; font-size: 12px; font-weight: bold; }
.online { background: #4CAF50; }
.offline { background: #666; color: #aaa; }
.active { background: #ff9800; }
.inactive { background: #333; color: #666; }
.muted { color: #888; font-size: 12px; }";

/// Render the debug page of a room
pub async fn room_page(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let details = room_service(&state).get_room(&room_id).await?;
    Ok(Html(render_room_page(&details, state.clock.now())))
}

fn render_room_page(details: &RoomDetails, now: DateTime<Utc>) -> String {
    let room_id = escape(&details.room.id);
    let mut page = String::with_capacity(4096);

    // Writing into a String cannot fail
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Room {room_id}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n\
         <h1>Room presence</h1>\n<p>Room: <span class=\"room-id\">{room_id}</span></p>\n\
         <p class=\"muted\">Auto-refresh every {secs} seconds | Last update: {time}</p>\n\
         <h2>Members ({count})</h2>\n",
        secs = REFRESH_MS / 1000,
        time = now.format("%H:%M:%S"),
        count = details.members.len(),
    );

    if details.members.is_empty() {
        page.push_str("<p class=\"muted\">No members in this room</p>\n");
    }

    for member in &details.members {
        let user_id = escape(&member.user_id);
        let avatar = match member.avatar_path.as_deref() {
            Some(path) if path.starts_with("http") => {
                format!("<img src=\"{}\" alt=\"avatar\">", escape(path))
            }
            Some(_) => format!("<img src=\"/api/v1/users/{user_id}/avatar\" alt=\"avatar\">"),
            None => String::new(),
        };
        let (status_class, status) = if member.is_online {
            ("online", "ONLINE")
        } else {
            ("offline", "OFFLINE")
        };
        let activity = match (&member.active_app, member.focus_mode && member.is_online) {
            (Some(app), _) => format!("<span class=\"badge active\">{}</span>", escape(app)),
            (None, true) => "<span class=\"badge inactive\">Focus</span>".to_string(),
            (None, false) => "<span class=\"badge inactive\">Idle</span>".to_string(),
        };
        let last_seen = member
            .last_seen
            .map(|seen| seen.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());

        let _ = write!(
            page,
            "<div class=\"member\">\n<div class=\"avatar\">{avatar}</div>\n<div>\n\
             <strong>{name}</strong> <span class=\"muted\">{user_id}</span>\n\
             <div><span class=\"badge {status_class}\">{status}</span> {activity}</div>\n\
             <div class=\"muted\">Last seen: {last_seen}</div>\n</div>\n</div>\n",
            name = escape(member.name.as_deref().unwrap_or("Anonymous")),
        );
    }

    let _ = write!(
        page,
        "<script>setTimeout(() => location.reload(), {REFRESH_MS});</script>\n</body>\n</html>\n"
    );
    page
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
