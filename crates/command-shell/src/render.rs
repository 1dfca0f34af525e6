//! Reply formatting.

use crate::adapter::Reply;
use crate::config::OutputFormat;
use crate::error::AppResult;
use serde_json::json;

pub fn render(reply: &Reply, format: OutputFormat) -> AppResult<String> {
    let rendered = match format {
        OutputFormat::Text => match reply {
            Reply::Value(value) => value.to_string(),
            Reply::Text(text) => text.clone(),
            Reply::Error(message) => format!("Error: {}", message),
        },
        OutputFormat::Json => {
            let body = match reply {
                Reply::Value(value) => json!({ "ok": true, "value": value }),
                Reply::Text(text) => json!({ "ok": true, "text": text }),
                Reply::Error(message) => json!({ "ok": false, "error": message }),
            };
            serde_json::to_string(&body)?
        }
    };
    Ok(rendered)
}
