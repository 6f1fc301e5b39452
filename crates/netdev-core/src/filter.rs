//! Virtual/container interface exclusion.

/// Name fragments of interfaces managed by container and VM tooling.
pub const DEFAULT_DENY_LIST: &[&str] = &["docker", "virbr", "veth"];

/// Substring deny-list, built once per acquisition source.
#[derive(Debug, Clone)]
pub struct InterfaceFilter {
    deny: Vec<String>,
}

impl InterfaceFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            deny: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// True when `name` contains any deny-listed fragment.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.deny.iter().any(|p| name.contains(p.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.deny
    }
}

impl Default for InterfaceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_LIST.iter().copied())
    }
}
