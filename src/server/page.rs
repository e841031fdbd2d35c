//! HTML for the prediction form

/// Message shown under the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    None,
    Result(&'a str),
    Error(&'a str),
}

const NOTICE_SLOT: &str = "{{notice}}";

const HOME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Anemia Prediction</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 560px;
            margin: 0 auto;
            padding: 20px;
            background: #fafafa;
            color: #222;
        }
        h1 { color: #b71c1c; }
        form {
            background: #fff;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 1px 3px rgba(0, 0, 0, 0.15);
        }
        label { display: block; margin-top: 12px; font-weight: 600; }
        input, select { width: 100%; padding: 8px; margin-top: 4px; box-sizing: border-box; }
        button {
            margin-top: 18px;
            padding: 10px 16px;
            background: #b71c1c;
            color: #fff;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        .result { margin-top: 20px; font-size: 1.3em; font-weight: 700; }
        .error { margin-top: 20px; color: #b71c1c; }
    </style>
</head>
<body>
    <h1>Anemia Prediction</h1>
    <form action="/predict" method="post">
        <label for="gender">Gender</label>
        <select id="gender" name="gender">
            <option value="Male">Male</option>
            <option value="Female">Female</option>
        </select>

        <label for="hemoglobin">Hemoglobin (g/dL)</label>
        <input id="hemoglobin" name="hemoglobin" type="number" step="any" required>

        <label for="mch">MCH (pg)</label>
        <input id="mch" name="mch" type="number" step="any" required>

        <label for="mchc">MCHC (g/dL)</label>
        <input id="mchc" name="mchc" type="number" step="any" required>

        <label for="mcv">MCV (fL)</label>
        <input id="mcv" name="mcv" type="number" step="any" required>

        <button type="submit">Predict</button>
    </form>
    {{notice}}
</body>
</html>"#;

/// Render the form page with an optional notice
pub fn render(notice: Notice<'_>) -> String {
    let block = match notice {
        Notice::None => String::new(),
        Notice::Result(text) => format!(r#"<div class="result">{}</div>"#, escape_html(text)),
        Notice::Error(text) => format!(r#"<div class="error">{}</div>"#, escape_html(text)),
    };
    HOME_TEMPLATE.replace(NOTICE_SLOT, &block)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}
