use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{Html, Response};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use super::escape_markup;
use crate::errors::AppError;
use crate::models::{RefreshNotice, Reservation};
use crate::state::AppState;

static DASHBOARD_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Reservations</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem; color: #222; }
  table { border-collapse: collapse; width: 100%; }
  th, td { padding: .45rem .7rem; border-bottom: 1px solid #ddd; text-align: left; }
  th { background: #f5f5f5; }
  .status-confirmed { color: #1a7f37; }
  .status-cancelled { color: #b42318; text-decoration: line-through; }
  .status-updated { color: #9a6700; }
  .empty { color: #888; font-style: italic; }
</style>
</head>
<body>
<h1>Reservations</h1>
"#;

static DASHBOARD_SCRIPT: &str = r#"<script>
(function connect() {
  const scheme = location.protocol === "https:" ? "wss://" : "ws://";
  const socket = new WebSocket(scheme + location.host + "/ws");
  socket.onmessage = function (event) {
    try {
      if (JSON.parse(event.data).event === "refresh") location.reload();
    } catch (_) {}
  };
  socket.onclose = function () { setTimeout(connect, 3000); };
})();
</script>
</body>
</html>
"#;

pub fn render_dashboard(reservations: &[Reservation]) -> String {
    let mut html = String::from(DASHBOARD_HEAD);

    if reservations.is_empty() {
        html.push_str("<p class=\"empty\">No reservations yet.</p>\n");
    } else {
        html.push_str(
            "<table>\n<thead><tr><th>ID</th><th>Date &amp; time</th><th>Business</th><th>Party</th>\
             <th>Name</th><th>Email</th><th>Phone</th><th>Table</th><th>Notes</th><th>Status</th></tr></thead>\n<tbody>\n",
        );
        for r in reservations {
            let optional = |v: &Option<String>| escape_markup(v.as_deref().unwrap_or(""));
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td class=\"status-{status}\">{status}</td></tr>\n",
                escape_markup(&r.reservation_id),
                escape_markup(&r.datetime),
                escape_markup(&r.business),
                r.party_size,
                escape_markup(&r.customer_name),
                escape_markup(&r.customer_email),
                optional(&r.phone),
                optional(&r.table),
                optional(&r.notes),
                status = r.status.as_str(),
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    html.push_str(DASHBOARD_SCRIPT);
    html
}

// GET /dashboard and GET /
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let reservations = state.store.list()?;
    Ok(Html(render_dashboard(&reservations)))
}

// GET /ws
pub async fn ws_upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    // Subscribe before the upgrade completes so no notice is missed after the handshake.
    let notices = state.events.subscribe();
    ws.on_upgrade(move |socket| run_ws(socket, notices))
}

async fn run_ws(mut socket: WebSocket, notices: broadcast::Receiver<RefreshNotice>) {
    let mut notices = BroadcastStream::new(notices);
    tracing::info!("dashboard client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            notice = notices.next() => match notice {
                Some(Ok(notice)) => {
                    let Ok(text) = serde_json::to_string(&notice) else { continue };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "dashboard client lagged, notices dropped");
                }
                None => break,
            },
        }
    }

    tracing::info!("dashboard client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReservationStatus;

    #[test]
    fn test_render_escapes_fields() {
        let reservation = Reservation {
            reservation_id: "RES-1".to_string(),
            datetime: "2025-06-15T19:00".to_string(),
            business: "bistro".to_string(),
            party_size: 3,
            customer_name: "<script>alert(1)</script>".to_string(),
            customer_email: "a@b.c".to_string(),
            phone: None,
            table: Some("T2".to_string()),
            notes: None,
            status: ReservationStatus::Cancelled,
            created_at: None,
        };
        let html = render_dashboard(&[reservation]);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<td class=\"status-cancelled\">cancelled</td>"));
        assert!(html.contains("<td>T2</td>"));
        assert!(html.contains("/ws"));
    }

    #[test]
    fn test_render_empty() {
        assert!(render_dashboard(&[]).contains("No reservations yet."));
    }
}
