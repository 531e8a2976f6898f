use serde::Serialize;
use tracing::warn;

/// Payload handed to the external notification dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub to_user_id: String,
    pub title: String,
    pub message: String,
}

fn notify_api_url() -> Option<String> {
    std::env::var("NOTIFY_API_URL").ok().filter(|v| !v.is_empty())
}

/// Fire-and-forget fan-out. Runs off the request task; a dead dispatcher
/// costs a warning, never a failed request. With no NOTIFY_API_URL set the
/// whole thing is a no-op (local dev, tests).
pub fn dispatch(notifications: Vec<Notification>) {
    let Some(url) = notify_api_url() else {
        return;
    };
    if notifications.is_empty() {
        return;
    }

    tokio::spawn(async move {
        let client = reqwest::Client::new();
        for notification in notifications {
            let res = client.post(&url).json(&notification).send().await;
            match res {
                Ok(resp) if !resp.status().is_success() => {
                    warn!(
                        status = %resp.status(),
                        to_user_id = %notification.to_user_id,
                        "notification dispatcher refused payload"
                    );
                }
                Err(err) => {
                    warn!(error = %err, url = %url, "notification dispatch failed");
                }
                Ok(_) => {}
            }
        }
    });
}
