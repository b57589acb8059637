//! Import path to repository root discovery.
//!
//! Well-known hosts are matched against a static table. Anything else is
//! discovered the way `go get` does it: fetch `https://<path>?go-get=1`
//! (retrying over http if that fails) and read the `go-import` meta tag.

use super::{RepoRoot, RepoRootResolver, VcsKind};
use crate::error::WtoolError;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

const USER_AGENT: &str = concat!("wtool/", env!("CARGO_PKG_VERSION"));

struct HostRule {
    /// Import path prefix the rule applies to; empty matches anything
    prefix: &'static str,
    pattern: Regex,
    /// VCS command; `None` takes it from the `vcs` capture
    vcs: Option<&'static str>,
}

static HOST_RULES: LazyLock<Vec<HostRule>> = LazyLock::new(|| {
    vec![
        HostRule {
            prefix: "github.com/",
            pattern: Regex::new(
                r"^(?P<root>github\.com/[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+)(/[\p{L}0-9_.\-]+)*$",
            )
            .unwrap(),
            vcs: Some("git"),
        },
        HostRule {
            prefix: "bitbucket.org/",
            pattern: Regex::new(
                r"^(?P<root>bitbucket\.org/[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
            )
            .unwrap(),
            vcs: Some("git"),
        },
        HostRule {
            prefix: "launchpad.net/",
            pattern: Regex::new(
                r"^(?P<root>launchpad\.net/(([A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)?|~[A-Za-z0-9_.\-]+/(\+junk|[A-Za-z0-9_.\-]+)/[A-Za-z0-9_.\-]+))(/[A-Za-z0-9_.\-]+)*$",
            )
            .unwrap(),
            vcs: Some("bzr"),
        },
        HostRule {
            prefix: "hub.jazz.net/git/",
            pattern: Regex::new(
                r"^(?P<root>hub\.jazz\.net/git/[a-z0-9]+/[A-Za-z0-9_.\-]+)(/[A-Za-z0-9_.\-]+)*$",
            )
            .unwrap(),
            vcs: Some("git"),
        },
        HostRule {
            prefix: "git.apache.org/",
            pattern: Regex::new(
                r"^(?P<root>git\.apache\.org/[a-z0-9_.\-]+\.git)(/[A-Za-z0-9_.\-]+)*$",
            )
            .unwrap(),
            vcs: Some("git"),
        },
        HostRule {
            prefix: "git.openstack.org/",
            pattern: Regex::new(
                r"^(?P<root>git\.openstack\.org/[A-Za-z0-9_.\-]+/[A-Za-z0-9_.\-]+)(\.git)?(/[A-Za-z0-9_.\-]+)*$",
            )
            .unwrap(),
            vcs: Some("git"),
        },
        // Explicit VCS suffix: example.com/repo.git/sub
        HostRule {
            prefix: "",
            pattern: Regex::new(
                r"^(?P<root>([a-z0-9.\-]+\.)+[a-z0-9.\-]+(:[0-9]+)?/[A-Za-z0-9_.\-/]*?\.(?P<vcs>bzr|git|hg|svn|fossil))(/[A-Za-z0-9_.\-]+)*$",
            )
            .unwrap(),
            vcs: None,
        },
    ]
});

static META_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<meta\s([^>]*)>").unwrap());

static META_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z][a-z\-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

/// A `<meta name="go-import" content="prefix vcs repo">` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaImport {
    pub prefix: String,
    pub vcs: String,
    pub repo_root: String,
}

/// Resolves repository roots from the static host table, falling back to
/// go-get discovery (https first, then http).
pub struct VcsDiscovery {
    agent: ureq::Agent,
    verbose: bool,
}

impl VcsDiscovery {
    pub fn new(timeout: Duration, verbose: bool) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent, verbose }
    }

    /// Fetch the go-get page over https, falling back to plain http when the
    /// https request fails.
    fn fetch_go_get(&self, import_path: &str) -> Result<String, WtoolError> {
        let https_err = match self.fetch(&go_get_url("https", import_path)) {
            Ok(body) => return Ok(body),
            Err(e) => e,
        };
        if self.verbose {
            eprintln!("   https fetch failed: {}", https_err);
        }

        self.fetch(&go_get_url("http", import_path))
            .map_err(|http_err| WtoolError::VcsResolution {
                import_path: import_path.to_string(),
                message: format!(
                    "https fetch failed: {}; http fetch failed: {}",
                    https_err, http_err
                ),
            })
    }

    fn fetch(&self, url: &str) -> Result<String, ureq::Error> {
        if self.verbose {
            eprintln!("   GET {}", url);
        }
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()?;
        response.body_mut().read_to_string()
    }
}

fn go_get_url(scheme: &str, import_path: &str) -> String {
    format!("{}://{}?go-get=1", scheme, import_path)
}

impl RepoRootResolver for VcsDiscovery {
    fn repo_root_for_import_path(&self, import_path: &str) -> Result<RepoRoot, WtoolError> {
        if let Some(root) = static_repo_root(import_path)? {
            return Ok(root);
        }

        let host = import_path.split('/').next().unwrap_or_default();
        if !host.contains('.') {
            return Err(WtoolError::VcsResolution {
                import_path: import_path.to_string(),
                message: "import path does not begin with hostname".to_string(),
            });
        }

        let html = self.fetch_go_get(import_path)?;
        let imports = parse_go_import_meta(&html);
        let meta = select_meta_import(import_path, &imports)?;
        Ok(RepoRoot {
            vcs: VcsKind::from_cmd(&meta.vcs),
            repo: meta.repo_root.clone(),
            root: meta.prefix.clone(),
        })
    }
}

/// Match `import_path` against the well-known host table.
///
/// Returns `Ok(None)` when no host rule applies and dynamic discovery is
/// needed.
pub fn static_repo_root(import_path: &str) -> Result<Option<RepoRoot>, WtoolError> {
    if import_path.contains("://") {
        return Err(WtoolError::VcsResolution {
            import_path: import_path.to_string(),
            message: "import path must not contain a URL scheme".to_string(),
        });
    }

    for rule in HOST_RULES.iter() {
        if !import_path.starts_with(rule.prefix) {
            continue;
        }

        let Some(caps) = rule.pattern.captures(import_path) else {
            if rule.prefix.is_empty() {
                continue;
            }
            return Err(WtoolError::VcsResolution {
                import_path: import_path.to_string(),
                message: format!("invalid {} import path", rule.prefix.trim_end_matches('/')),
            });
        };

        let root = caps["root"].to_string();
        let vcs = match rule.vcs {
            Some(cmd) => cmd,
            None => caps.name("vcs").map(|m| m.as_str()).unwrap_or("git"),
        };
        return Ok(Some(RepoRoot {
            vcs: VcsKind::from_cmd(vcs),
            repo: format!("https://{}", root),
            root,
        }));
    }

    Ok(None)
}

/// Extract `go-import` meta tags from the head of an HTML document.
pub fn parse_go_import_meta(html: &str) -> Vec<MetaImport> {
    // Meta tags after <body> are not honored by go get.
    let head = match html.to_ascii_lowercase().find("<body") {
        Some(end) => &html[..end],
        None => html,
    };

    let mut imports = Vec::new();
    for tag in META_TAG.captures_iter(head) {
        let mut name = None;
        let mut content = None;
        for attr in META_ATTR.captures_iter(&tag[1]) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match attr[1].to_ascii_lowercase().as_str() {
                "name" => name = Some(value),
                "content" => content = Some(value),
                _ => {}
            }
        }

        if name != Some("go-import") {
            continue;
        }
        let Some(content) = content else { continue };
        let fields: Vec<&str> = content.split_whitespace().collect();
        if let [prefix, vcs, repo_root] = fields.as_slice() {
            imports.push(MetaImport {
                prefix: prefix.to_string(),
                vcs: vcs.to_string(),
                repo_root: repo_root.to_string(),
            });
        }
    }
    imports
}

/// Pick the single meta import whose prefix covers `import_path`.
pub fn select_meta_import<'a>(
    import_path: &str,
    imports: &'a [MetaImport],
) -> Result<&'a MetaImport, WtoolError> {
    let mut matches = imports.iter().filter(|m| {
        m.vcs != "mod"
            && (import_path == m.prefix
                || import_path
                    .strip_prefix(m.prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/')))
    });

    let Some(found) = matches.next() else {
        return Err(WtoolError::VcsResolution {
            import_path: import_path.to_string(),
            message: "no go-import meta tags found".to_string(),
        });
    };

    if let Some(other) = matches.next() {
        return Err(WtoolError::VcsResolution {
            import_path: import_path.to_string(),
            message: format!(
                "multiple meta tags match import path ({} and {})",
                found.prefix, other.prefix
            ),
        });
    }

    if !found.repo_root.contains("://") {
        return Err(WtoolError::VcsResolution {
            import_path: import_path.to_string(),
            message: format!("invalid repo root {:?}: missing scheme", found.repo_root),
        });
    }

    Ok(found)
}
