//! Binary name resolution.
//!
//! Downstream packages reach the tools through namespaced aliases installed
//! alongside this generator (`unified.eslint`, `unified.jest`, ...). The
//! generator's own package calls the plain binaries instead.

use crate::ulog_trace;

/// Namespace prefixed to every binary for downstream consumers.
pub const NAMESPACE: &str = "unified";

/// Decides whether a tool name needs the namespace prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinResolver {
    self_build: bool,
}

impl BinResolver {
    pub fn new(self_build: bool) -> Self {
        Self { self_build }
    }

    /// Resolver used when rendering the generator's own scripts.
    pub fn self_build() -> Self {
        Self::new(true)
    }

    pub fn is_self_build(&self) -> bool {
        self.self_build
    }

    pub fn resolve(&self, tool: &str) -> String {
        let resolved = if self.self_build {
            tool.to_string()
        } else {
            format!("{}.{}", NAMESPACE, tool)
        };
        ulog_trace!("resolve {} -> {}", tool, resolved);
        resolved
    }
}
