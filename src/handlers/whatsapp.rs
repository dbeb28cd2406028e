use std::sync::Arc;

use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::escape_markup;
use crate::services::bridge;
use crate::state::AppState;

const FALLBACK_REPLY: &str = "Sorry, I'm having trouble right now. Please try again in a moment.";

fn signing_mac(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<Hmac<Sha1>> {
    let mut data = url.to_string();
    let mut sorted_params: Vec<&(String, String)> = params.iter().collect();
    sorted_params.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    for (key, value) in sorted_params {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = Hmac::<Sha1>::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(data.as_bytes());
    Some(mac)
}

/// Twilio request signature: base64(HMAC-SHA1(auth_token, url + sorted key/value pairs)).
pub fn twilio_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> Option<String> {
    let mac = signing_mac(auth_token, url, params)?;
    Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Checks an `X-Twilio-Signature` header value in constant time.
pub fn verify_twilio_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    header: &str,
) -> bool {
    let Ok(sig_bytes) = base64::engine::general_purpose::STANDARD.decode(header.trim()) else {
        return false;
    };
    signing_mac(auth_token, url, params)
        .map(|mac| mac.verify_slice(&sig_bytes).is_ok())
        .unwrap_or(false)
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim())
}

fn webhook_url(headers: &HeaderMap, path: &str) -> String {
    // Behind a proxy the public scheme/host come from X-Forwarded-*
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}{path}")
}

// POST /whatsapp
pub async fn whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> Response {
    let auth_token = &state.config.twilio_auth_token;
    if !auth_token.is_empty() {
        let signature = headers
            .get("x-twilio-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if signature.is_empty() {
            tracing::warn!("missing X-Twilio-Signature header");
            return (StatusCode::FORBIDDEN, "Missing signature").into_response();
        }

        let url = webhook_url(&headers, &uri.to_string());
        if !verify_twilio_signature(auth_token, &url, &params, signature) {
            tracing::warn!(url = %url, "invalid Twilio signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    let from = param(&params, "From").unwrap_or("");
    let body = param(&params, "Body").unwrap_or("");
    tracing::info!(from = %from, body = %body, "incoming WhatsApp message");

    if body.is_empty() {
        return twiml_response(None);
    }

    let session = Some(from).filter(|f| !f.is_empty());
    let reply = match bridge::relay_message(&state, body, session, session).await {
        Ok(outcome) => outcome.reply,
        Err(e) => {
            tracing::error!(error = %e, from = %from, "WhatsApp relay failed");
            FALLBACK_REPLY.to_string()
        }
    };

    twiml_response(Some(&reply))
}

fn twiml_response(message: Option<&str>) -> Response {
    let body = match message {
        Some(text) => format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
            escape_markup(text)
        ),
        None => "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>".to_string(),
    };
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
