use nu_ansi_term::Color;
use std::fmt::Write as _;

/// A route recorded at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: String,
    pub path: String,
    /// Fully qualified type name of the handler.
    pub handler: String,
}

impl RouteInfo {
    pub(crate) fn new(method: &str, path: &str, handler: &str) -> Self {
        Self { method: method.to_owned(), path: path.to_owned(), handler: handler.to_owned() }
    }
}

fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" | "PUT" | "PATCH" => Color::Yellow,
        "DELETE" => Color::Red,
        _ => Color::White,
    }
}

/// Renders one row per route, skipping paths that start with any of
/// `exclude`. Methods are colored with ANSI escapes when `ansi` is set.
pub(crate) fn render(routes: &[RouteInfo], exclude: &[&str], ansi: bool) -> String {
    let visible: Vec<&RouteInfo> = routes
        .iter()
        .filter(|r| !exclude.iter().any(|prefix| r.path.starts_with(prefix)))
        .collect();
    let width = visible.iter().map(|r| r.path.len()).max().unwrap_or(0);

    let mut out = String::new();
    for route in visible {
        let method = format!("{:<7}", route.method);
        let method =
            if ansi { method_color(&route.method).paint(method).to_string() } else { method };
        let _ = writeln!(out, "{method} {:<width$}  {}", route.path, route.handler);
    }
    out
}
