//! Dashboard page

use std::fmt::Write;

use axum::{extract::State, response::Html};

use crate::AppState;
use crate::logic::policy::STATUS_FIRE;
use crate::models::{ClassifiedEvent, FLAME_DETECTED};

const REFRESH_SECONDS: u32 = 5;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let history = state.ingest.all();
    let latest = history
        .last()
        .cloned()
        .unwrap_or_else(ClassifiedEvent::awaiting_data);
    Html(render(&latest, &history))
}

/// Render the page; the table lists newest events first.
pub fn render(latest: &ClassifiedEvent, history: &[ClassifiedEvent]) -> String {
    let mut rows = String::new();
    for event in history.iter().rev() {
        let _ = write!(
            rows,
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{}</td><td>{:.0}%</td><td>{}</td></tr>",
            row_class(event),
            escape(&event.timestamp),
            escape(&event.device_id),
            event.temperature,
            event.humidity,
            escape(&event.flame_text),
            event.probability * 100.0,
            escape(&event.status),
        );
    }
    if history.is_empty() {
        rows.push_str("<tr><td colspan=\"7\">Nenhum evento recebido</td></tr>");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh}">
<title>Monitor de Incêndio</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; background: #111; color: #eee; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border-bottom: 1px solid #333; padding: .4rem .6rem; text-align: left; }}
.alert {{ background: #5a1010; }}
.card {{ padding: 1rem; margin-bottom: 1.5rem; border-radius: 6px; background: #222; }}
</style>
</head>
<body>
<h1>Monitor de Incêndio</h1>
<div class="card {latest_class}">
<h2>{status}</h2>
<p>{temperature:.1} °C · {humidity:.1}% · {flame_text} · risco {probability:.0}% · {device} · {timestamp}</p>
</div>
<table>
<thead><tr><th>Hora</th><th>Dispositivo</th><th>°C</th><th>Umidade</th><th>Chama</th><th>Risco</th><th>Status</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
</body>
</html>
"#,
        refresh = REFRESH_SECONDS,
        latest_class = row_class(latest),
        status = escape(&latest.status),
        temperature = latest.temperature,
        humidity = latest.humidity,
        flame_text = escape(&latest.flame_text),
        probability = latest.probability * 100.0,
        device = escape(&latest.device_id),
        timestamp = escape(&latest.timestamp),
        rows = rows,
    )
}

fn row_class(event: &ClassifiedEvent) -> &'static str {
    if event.flame == FLAME_DETECTED || event.status == STATUS_FIRE {
        "alert"
    } else {
        ""
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
