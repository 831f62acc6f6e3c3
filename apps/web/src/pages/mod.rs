// HTML pages for the two-step form flow: topic entry, then theme selection.
// Markup is built inline; user input is always escaped.

pub mod handlers;

use crate::pptx::RgbColor;
use crate::render::{Theme, THEMES};

pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a topic.";

const STYLE: &str = r#"<style>
body{font-family:Segoe UI,Arial,sans-serif;background:#f5f7fa;margin:0;padding:40px;color:#212529}
main{max-width:760px;margin:0 auto;background:#fff;padding:32px;border-radius:12px;box-shadow:0 2px 12px rgba(0,0,0,.08)}
h1{margin-top:0;color:#043a6b}
input[type=text]{width:100%;padding:12px;font-size:16px;border:1px solid #ccd;border-radius:6px;box-sizing:border-box}
button{margin-top:16px;padding:12px 24px;font-size:16px;border:0;border-radius:6px;background:#0b66b6;color:#fff;cursor:pointer}
.error{color:#b00020;margin-bottom:12px}
.themes{display:grid;grid-template-columns:repeat(2,1fr);gap:16px}
.theme{display:block;border:2px solid #dde;border-radius:10px;padding:12px;cursor:pointer}
.theme input{margin-right:8px}
.swatch{display:flex;height:56px;border-radius:6px;overflow:hidden;margin-top:8px}
.swatch span{flex:1}
.swatch .bar{flex:0 0 14px}
</style>"#;

fn escape(text: &str) -> std::borrow::Cow<'_, str> {
    quick_xml::escape::escape(text)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title>{STYLE}</head><body><main>{body}</main></body></html>",
        escape(title)
    )
}

/// Topic entry form. `error` is shown above the input when set.
pub fn index_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>AI Presentation Generator</h1>");
    body.push_str("<p>Enter a topic and we'll draft a 5-slide deck for you.</p>");
    if let Some(error) = error {
        body.push_str(&format!(r#"<p class="error">{}</p>"#, escape(error)));
    }
    body.push_str(
        r#"<form method="post" action="/select_theme">
<input type="text" name="topic" placeholder="e.g. Renewable energy in 2030" autofocus>
<button type="submit">Choose a theme</button>
</form>"#,
    );
    page("AI Presentation Generator", &body)
}

fn swatch(class: &str, color: RgbColor) -> String {
    format!(r#"<span{class} style="background:#{}"></span>"#, color.hex())
}

fn theme_card(theme: &Theme, checked: bool) -> String {
    let swatches = [
        swatch(r#" class="bar""#, theme.accent_bar),
        swatch("", theme.background),
        swatch("", theme.title_color),
        swatch("", theme.bullet_color),
    ]
    .concat();
    format!(
        r#"<label class="theme"><input type="radio" name="theme" value="{name}"{checked}>{label}
<div class="swatch">{swatches}</div>
<small style="font-family:{font}">{font}</small></label>"#,
        name = theme.name,
        checked = if checked { " checked" } else { "" },
        label = escape(theme.label),
        font = escape(theme.font),
    )
}

/// Theme picker for `topic`; the topic rides along in a hidden field.
pub fn theme_page(topic: &str) -> String {
    let topic = escape(topic);
    let mut body = format!("<h1>Pick a theme</h1><p>Topic: <strong>{topic}</strong></p>");
    body.push_str(r#"<form method="post" action="/generate_ppt">"#);
    body.push_str(&format!(
        r#"<input type="hidden" name="topic" value="{topic}"><div class="themes">"#
    ));
    for (index, theme) in THEMES.iter().enumerate() {
        body.push_str(&theme_card(theme, index == 0));
    }
    body.push_str(r#"</div><button type="submit">Generate presentation</button></form>"#);
    page("Pick a theme", &body)
}
