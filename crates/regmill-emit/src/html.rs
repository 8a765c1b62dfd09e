//! HTML documentation emission.
//!
//! One self-contained `<map>_regs.html` page: a register overview table,
//! one field table per register, and the map constants. All numbers come
//! from the same model the hardware and firmware artifacts are rendered
//! from, so the page cannot drift from what was generated.

use regmill_core::{Field, RegisterMap};

use crate::error::Result;

/// Render `<map>_regs.html`.
pub fn render(map: &RegisterMap) -> Result<String> {
    let mut v: Vec<String> = Vec::new();
    v.push("<!DOCTYPE html>".into());
    v.push(format!(
        "<!-- Generated by regmill {}. Do not edit. -->",
        env!("CARGO_PKG_VERSION")
    ));
    v.push(format!("<!-- Model fingerprint: {} -->", map.fingerprint()));
    v.push(r#"<html lang="en">"#.into());
    v.push("<head>".into());
    v.push(r#"<meta charset="utf-8">"#.into());
    v.push(format!("<title>{} register map</title>", escape(&map.name)));
    v.push("<style>".into());
    v.push("body { font-family: sans-serif; margin: 2em; }".into());
    v.push("table { border-collapse: collapse; margin-bottom: 2em; }".into());
    v.push("th, td { border: 1px solid #999; padding: 0.3em 0.8em; text-align: left; }".into());
    v.push("th { background: #eee; }".into());
    v.push("code { background: #f4f4f4; padding: 0 0.2em; }".into());
    v.push("</style>".into());
    v.push("</head>".into());
    v.push("<body>".into());
    v.push(format!("<h1>{} register map</h1>", escape(&map.name)));
    if !map.description.is_empty() {
        v.push(format!("<p>{}</p>", escape(&map.description)));
    }
    v.push(format!(
        "<p>{}-bit register words, {} addressable words spanning {} bytes. Model fingerprint <code>{}</code>.</p>",
        map.word_width,
        map.element_count(),
        map.address_span(),
        map.fingerprint()
    ));

    if !map.registers.is_empty() {
        v.push(String::new());
        v.push("<h2>Registers</h2>".into());
        v.push("<table>".into());
        v.push(
            "<tr><th>Name</th><th>Address</th><th>Mode</th><th>Length</th><th>Default</th><th>Description</th></tr>"
                .into(),
        );
        for r in &map.registers {
            let name = if r.fields.is_empty() {
                escape(&r.name)
            } else {
                format!("<a href=\"#{0}\">{0}</a>", escape(&r.name))
            };
            v.push(format!(
                "<tr><td>{name}</td><td>{:#x}</td><td>{}</td><td>{}</td><td>{:#x}</td><td>{}</td></tr>",
                r.address,
                r.mode,
                r.count,
                r.default_word(),
                escape(&r.description)
            ));
        }
        v.push("</table>".into());
    }

    for r in map.registers.iter().filter(|r| !r.fields.is_empty()) {
        v.push(String::new());
        v.push(format!("<h2 id=\"{0}\">{0}</h2>", escape(&r.name)));
        if !r.description.is_empty() {
            v.push(format!("<p>{}</p>", escape(&r.description)));
        }
        v.push("<table>".into());
        v.push(
            "<tr><th>Bits</th><th>Name</th><th>Type</th><th>Default</th><th>Description</th></tr>"
                .into(),
        );
        for f in &r.fields {
            v.push(format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                bits_cell(f),
                escape(&f.name),
                escape(&f.kind.to_string()),
                escape(&f.default.to_string()),
                escape(&f.description)
            ));
        }
        v.push("</table>".into());
    }

    if !map.constants.is_empty() {
        v.push(String::new());
        v.push("<h2>Constants</h2>".into());
        v.push("<table>".into());
        v.push("<tr><th>Name</th><th>Value</th><th>Description</th></tr>".into());
        for c in &map.constants {
            v.push(format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&c.name),
                escape(&c.value.to_string()),
                escape(&c.description)
            ));
        }
        v.push("</table>".into());
    }

    v.push("</body>".into());
    v.push("</html>".into());
    Ok(v.join("\n") + "\n")
}

/// The bit range column: a single bit index, or `msb:lsb`.
fn bits_cell(f: &Field) -> String {
    if f.width == 1 {
        f.lsb().to_string()
    } else {
        format!("{}:{}", f.msb(), f.lsb())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
