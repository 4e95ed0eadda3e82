//! Monitoring assets bundled into the binary.
//!
//! Templates use `{{.Name}}` placeholders which are substituted by
//! [`render`].

/// Bundled assets as `(name, contents)` pairs, sorted by name.
static ASSETS: &[(&str, &str)] = &[
    (
        "grafana/config/dashboards.yml",
        include_str!("../assets/grafana/config/dashboards.yml"),
    ),
    (
        "grafana/config/prom.yml",
        include_str!("../assets/grafana/config/prom.yml"),
    ),
    (
        "grafana/dashboards/node_exporter.json",
        include_str!("../assets/grafana/dashboards/node_exporter.json"),
    ),
    (
        "prometheus/prometheus.yml",
        include_str!("../assets/prometheus/prometheus.yml"),
    ),
];

/// Look up a bundled asset by its relative name.
///
/// # Example
///
/// ```
/// let datasource = avspkg::assets::get("grafana/config/prom.yml").unwrap();
/// assert!(datasource.contains("{{.PromEndpoint}}"));
/// ```
pub fn get(name: &str) -> Option<&'static str> {
    ASSETS
        .binary_search_by(|(candidate, _)| (*candidate).cmp(name))
        .ok()
        .map(|index| ASSETS[index].1)
}

/// Iterate over every bundled asset in name order.
pub fn iter() -> impl Iterator<Item = (&'static str, &'static str)> {
    ASSETS.iter().copied()
}

/// Substitute `{{.Key}}` placeholders in a template.
///
/// Placeholders without a value are left untouched.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{.{}}}}}", key), value)
    })
}
