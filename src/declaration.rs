//! The `new_go_repository(...)` record appended for each dependency.

use crate::naming::ResolvedDependency;
use crate::workspace::{Attr, CallExpr};

/// Rule name used when `wtool.toml` does not override it.
pub const DEFAULT_RULE: &str = "new_go_repository";

/// One dependency ready to be written into `WORKSPACE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub importpath: String,
    pub commit: String,
}

impl Declaration {
    pub fn new(resolved: ResolvedDependency, commit: String) -> Self {
        Self {
            name: resolved.name,
            importpath: resolved.import_path,
            commit,
        }
    }

    /// Key/value pairs in the order they are written.
    pub fn attrs(&self) -> [(&'static str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("importpath", self.importpath.as_str()),
            ("commit", self.commit.as_str()),
        ]
    }

    /// Build the `rule(name = ..., importpath = ..., commit = ...)` call.
    pub fn to_call(&self, rule: &str) -> CallExpr {
        CallExpr {
            function: rule.to_string(),
            args: self
                .attrs()
                .into_iter()
                .map(|(key, value)| Attr::new(key, value))
                .collect(),
        }
    }

    /// First seven characters of the commit, for display.
    pub fn short_commit(&self) -> &str {
        self.commit
            .char_indices()
            .nth(7)
            .map_or(self.commit.as_str(), |(i, _)| &self.commit[..i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glog() -> Declaration {
        Declaration::new(
            ResolvedDependency {
                name: "com_github_golang_glog".to_string(),
                import_path: "github.com/golang/glog".to_string(),
            },
            "23def4e6c14b4da8ac2ed8007337bc5eb5007998".to_string(),
        )
    }

    #[test]
    fn test_key_order() {
        let call = glog().to_call(DEFAULT_RULE);
        assert_eq!(call.function, "new_go_repository");
        let keys: Vec<&str> = call.args.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["name", "importpath", "commit"]);
        assert_eq!(call.args[1].value, "github.com/golang/glog");
    }

    #[test]
    fn test_custom_rule() {
        let call = glog().to_call("go_repository");
        assert_eq!(call.function, "go_repository");
    }

    #[test]
    fn test_short_commit() {
        assert_eq!(glog().short_commit(), "23def4e");

        let mut short = glog();
        short.commit = "abc".to_string();
        assert_eq!(short.short_commit(), "abc");
    }
}
