//! Thin server-rendered pages.
//!
//! Just enough HTML to use the system from a browser: a login form and an
//! inventory table with the add/move/edit/remove/export forms posting to
//! the API endpoints. No template engine; the markup is assembled here.

use std::fmt::Write;

use crate::record::{MachineRecord, COLUMNS};

/// Escape text for safe embedding in HTML.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn flash_block(flash: Option<&str>) -> String {
    flash.map_or_else(String::new, |message| {
        format!("<p class=\"flash\">{}</p>", escape(message))
    })
}

/// Render the login page.
pub fn login(flash: Option<&str>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>headtrack - Login</title></head>
<body>
<h1>headtrack</h1>
{flash}
<form method="post" action="/login">
  <label>Password <input type="password" name="password" autofocus></label>
  <button type="submit">Log in</button>
</form>
</body>
</html>
"#,
        flash = flash_block(flash),
    )
}

/// Render the inventory page.
pub fn home(records: &[MachineRecord], flash: Option<&str>) -> String {
    let mut rows = String::new();
    for record in records {
        rows.push_str("<tr>");
        for value in record.values() {
            let _ = write!(rows, "<td>{}</td>", escape(value));
        }
        rows.push_str("</tr>\n");
    }

    let mut headers = String::new();
    for column in COLUMNS {
        let _ = write!(headers, "<th>{column}</th>");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>headtrack - Inventory</title></head>
<body>
<h1>Machine Inventory</h1>
{flash}
<p>Total entries: {total}</p>
<table border="1">
<tr>{headers}</tr>
{rows}</table>
<form method="post" action="/export"><button type="submit">Export all</button></form>
<p><a href="/logout">Log out</a></p>
</body>
</html>
"#,
        flash = flash_block(flash),
        total = records.len(),
    )
}
