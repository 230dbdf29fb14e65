//! Effective endpoint construction
//!
//! The connection setting's base path wins over the route path; a
//! non-default port is injected after the scheme/host segment when the base
//! path carries none; a relative route path is appended unless it is
//! already a suffix of the base.

use bus_core::{ConnectionSetting, Route};

/// Build the URL (or queue name) a route dispatch targets.
pub fn build_endpoint(setting: &ConnectionSetting, route: &Route) -> String {
    let mut base = if setting.base_path.is_empty() {
        route.path.clone()
    } else {
        setting.base_path.clone()
    };

    if setting.port > 0 && setting.port != 80 && setting.port != 443 {
        base = inject_port(&base, setting.port);
    }

    if !route.path.starts_with("http") && !base.ends_with(route.path.as_str()) {
        base = format!("{}{}", base.trim_end_matches('/'), route.path);
    }

    base
}

fn inject_port(base: &str, port: u16) -> String {
    let Some((scheme, remainder)) = base.split_once("://") else {
        return base.to_string();
    };

    let host_end = remainder.find('/').unwrap_or(remainder.len());
    let host = &remainder[..host_end];
    if host.contains(':') {
        // Explicit port already present
        return base.to_string();
    }

    format!("{scheme}://{host}:{port}{}", &remainder[host_end..])
}
