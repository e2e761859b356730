/// RouteClass
///
/// The access class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Anyone, with or without a session.
    Public,
    /// Requires a valid session.
    Authenticated,
    /// Requires a valid session whose account record carries the `admin` role.
    Admin,
    /// Only reachable without a session (login, registration, password reset).
    GuestOnly,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Public => "public",
            RouteClass::Authenticated => "authenticated",
            RouteClass::Admin => "admin",
            RouteClass::GuestOnly => "guest_only",
        }
    }
}

/// RouteRule
///
/// A path prefix bound to a class. The prefix is stored normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub prefix: String,
    pub class: RouteClass,
}

/// RedirectTargets
///
/// Where denied requests are sent: `login` for callers without a session, `landing` for
/// signed-in callers that hit a guest-only or admin route they may not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTargets {
    pub login: String,
    pub landing: String,
}

impl Default for RedirectTargets {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            landing: "/profile".to_string(),
        }
    }
}

/// RouteTable
///
/// Static prefix table built once at startup. Paths that match no rule are `Public`.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    targets: RedirectTargets,
}

impl Default for RouteTable {
    /// `/admin` is admin-only, `/profile` needs a session, `/auth` is for guests.
    fn default() -> Self {
        RouteTable::new(RedirectTargets::default())
            .with_rule("/admin", RouteClass::Admin)
            .with_rule("/profile", RouteClass::Authenticated)
            .with_rule("/auth", RouteClass::GuestOnly)
    }
}

impl RouteTable {
    /// An empty table: every path is `Public` until rules are added.
    pub fn new(targets: RedirectTargets) -> Self {
        Self {
            rules: Vec::new(),
            targets,
        }
    }

    pub fn with_rule(mut self, prefix: &str, class: RouteClass) -> Self {
        self.rules.push(RouteRule {
            prefix: normalize_path(prefix),
            class,
        });
        self
    }

    /// classify
    ///
    /// Normalizes the path, then picks the longest rule prefix that matches on a segment
    /// boundary (`/admin` covers `/admin/x` but not `/administrator`). On equal length the
    /// rule declared first wins.
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_path(path);

        let mut best: Option<&RouteRule> = None;
        for rule in &self.rules {
            if !matches_prefix(&path, &rule.prefix) {
                continue;
            }
            if best.is_none_or(|current| rule.prefix.len() > current.prefix.len()) {
                best = Some(rule);
            }
        }

        best.map(|rule| rule.class).unwrap_or(RouteClass::Public)
    }

    pub fn targets(&self) -> &RedirectTargets {
        &self.targets
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

/// normalize_path
///
/// Canonical form used for matching: query and fragment dropped, repeated slashes
/// collapsed, `.` segments removed, `..` segments pop their parent (never above the root),
/// no trailing slash. Always starts with `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
