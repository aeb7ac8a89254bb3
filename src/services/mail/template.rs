//! Built-in HTML mail template.
use serde::Deserialize;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <title>Hello</title>
  </head>
  <body style="font-family: sans-serif;">
    <h1>Hello, {{name}}!</h1>
    <p>This message was sent by the api-scaffold mail service.</p>
  </body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateData {
    pub name: String,
}

pub fn render_html(data: &TemplateData) -> String {
    HTML_TEMPLATE.replace("{{name}}", &escape_html(&data.name))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
