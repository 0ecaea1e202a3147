/// Render the bootstrap document loaded into the editor frame.
///
/// The frame gets a full-size `#container` for the editor, Monaco's AMD
/// loader from `lib_path`, then the adapter script which starts loading
/// the editor itself.
pub fn render_frame_document(lib_path: &str, adapter_src: &str) -> String {
    let loader_src = format!("{}/loader.js", lib_path.trim_end_matches('/'));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
html, body {{
    margin: 0px;
}}
body {{
    height: 100vh;
    overflow: hidden;
    margin: 0;
}}
#container {{
    width: 100%;
    height: 100%;
}}
</style>
<script src="{loader_src}"></script>
<script src="{adapter_src}" data-lib-path="{lib_path}"></script>
</head>
<body>
<div id="container"></div>
</body>
</html>"#,
        loader_src = escape_attr(&loader_src),
        adapter_src = escape_attr(adapter_src),
        lib_path = escape_attr(lib_path),
    )
}

/// Escape a value for use inside a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
