//! Route authorization gate.
//!
//! A stateless per-request decision guarding the three role namespaces
//! (`/user`, `/seller`, `/admin`). No I/O, no errors: every input maps to
//! [`GateDecision::Allow`] or a redirect.
//!
//! # Rules (first match wins, protected paths only)
//!
//! 1. No token → redirect to `/login/<namespace>`
//! 2. `loginType` is `admin` → allow
//! 3. `loginType` equals the namespace → allow
//! 4. Otherwise → redirect to `/`
//!
//! # Example
//!
//! ```
//! use verdant_auth::gate::{authorize, GateDecision};
//!
//! assert_eq!(authorize("/admin/orders", Some("t"), Some("admin")), GateDecision::Allow);
//! assert_eq!(
//!     authorize("/seller/products", Some("t"), Some("user")),
//!     GateDecision::Redirect("/".to_string())
//! );
//! assert_eq!(
//!     authorize("/user/cart", None, None),
//!     GateDecision::Redirect("/login/user".to_string())
//! );
//! ```

use crate::claims::SessionSigner;
use crate::cookies::RequestCookies;
use crate::state::Role;
use verdant_core::environment::Clock;

/// Where rule 4 sends mismatched roles.
pub const HOME_PATH: &str = "/";

/// A protected path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `/user/...`
    User,
    /// `/seller/...`
    Seller,
    /// `/admin/...`
    Admin,
}

impl Namespace {
    /// All protected namespaces.
    pub const ALL: [Self; 3] = [Self::User, Self::Seller, Self::Admin];

    /// Namespace guarding `path`, matched by whole first segment.
    ///
    /// `/user` and `/user/x` are in the user namespace; `/users` is not.
    #[must_use]
    pub fn of_path(path: &str) -> Option<Self> {
        let rest = path.strip_prefix('/')?;
        let segment = rest.split(['/', '?', '#']).next().unwrap_or_default();
        Self::ALL.into_iter().find(|ns| ns.as_str() == segment)
    }

    /// Segment name, equal to the matching `loginType` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.role().as_str()
    }

    /// Role that owns this namespace.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::User => Role::User,
            Self::Seller => Role::Seller,
            Self::Admin => Role::Admin,
        }
    }

    /// Login page for this namespace.
    #[must_use]
    pub fn login_path(self) -> String {
        format!("/login/{}", self.as_str())
    }
}

/// Gate state for a protected path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No usable token.
    NoToken,
    /// Token present, role may enter (own namespace, or admin).
    RoleMatchesPath,
    /// Token present, role may not enter.
    RoleMismatchesPath,
}

/// Gate outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue to the requested page.
    Allow,
    /// Send the browser here instead.
    Redirect(String),
}

impl GateDecision {
    /// Redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Redirect(location) => Some(location),
        }
    }
}

/// Classify a request. `None` for unprotected paths.
///
/// Empty strings count as absent.
#[must_use]
pub fn classify(path: &str, token: Option<&str>, login_type: Option<&str>) -> Option<GateState> {
    let namespace = Namespace::of_path(path)?;

    if token.is_none_or(str::is_empty) {
        return Some(GateState::NoToken);
    }

    let allowed = match login_type.and_then(Role::parse) {
        Some(Role::Admin) => true,
        Some(role) => role == namespace.role(),
        None => false,
    };

    Some(if allowed {
        GateState::RoleMatchesPath
    } else {
        GateState::RoleMismatchesPath
    })
}

/// Decide whether a request may proceed.
#[must_use]
pub fn authorize(path: &str, token: Option<&str>, login_type: Option<&str>) -> GateDecision {
    match (classify(path, token, login_type), Namespace::of_path(path)) {
        (Some(GateState::NoToken), Some(namespace)) => GateDecision::Redirect(namespace.login_path()),
        (Some(GateState::RoleMismatchesPath), _) => GateDecision::Redirect(HOME_PATH.to_string()),
        _ => GateDecision::Allow,
    }
}

/// Where the gate takes the role from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleSource {
    /// The plain `loginType` cookie.
    #[default]
    Cookie,
    /// A verified `session` claims cookie. A missing or invalid one counts
    /// as no token.
    SignedSession,
}

impl RoleSource {
    /// Parse a config value (`cookie` or `signed`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cookie" => Some(Self::Cookie),
            "signed" | "signed_session" => Some(Self::SignedSession),
            _ => None,
        }
    }
}

/// The gate bound to a role source.
#[derive(Debug, Clone)]
pub struct RouteGate {
    role_source: RoleSource,
    signer: Option<SessionSigner>,
}

impl RouteGate {
    /// Gate trusting the `loginType` cookie.
    #[must_use]
    pub const fn cookie() -> Self {
        Self {
            role_source: RoleSource::Cookie,
            signer: None,
        }
    }

    /// Gate deriving the role from signed claims.
    #[must_use]
    pub const fn signed(signer: SessionSigner) -> Self {
        Self {
            role_source: RoleSource::SignedSession,
            signer: Some(signer),
        }
    }

    /// Configured role source.
    #[must_use]
    pub const fn role_source(&self) -> RoleSource {
        self.role_source
    }

    /// Decide a request from its cookies.
    #[must_use]
    pub fn decide(&self, path: &str, cookies: &RequestCookies, clock: &dyn Clock) -> GateDecision {
        let decision = match (&self.role_source, &self.signer) {
            (RoleSource::SignedSession, Some(signer)) => {
                let token = cookies.token.as_deref().unwrap_or_default();
                let role = cookies
                    .session
                    .as_deref()
                    .and_then(|jwt| signer.verify(jwt, clock).ok())
                    .filter(|claims| claims.binds(token))
                    .map(|claims| claims.role);
                authorize(
                    path,
                    role.and(cookies.token.as_deref()),
                    role.map(Role::as_str),
                )
            },
            _ => authorize(path, cookies.token.as_deref(), cookies.login_type.as_deref()),
        };

        match &decision {
            GateDecision::Allow => tracing::debug!(path, "Gate allowed request"),
            GateDecision::Redirect(location) => {
                tracing::info!(path, %location, "Gate redirected request");
            },
        }

        decision
    }
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::cookie()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Session;
    use serde_json::json;
    use verdant_testing::test_clock;

    fn redirect(to: &str) -> GateDecision {
        GateDecision::Redirect(to.to_string())
    }

    #[test]
    fn test_admin_enters_every_namespace() {
        for path in ["/admin/x", "/user/x", "/seller/x"] {
            assert_eq!(authorize(path, Some("t"), Some("admin")), GateDecision::Allow);
        }
    }

    #[test]
    fn test_cross_role_goes_home() {
        assert_eq!(authorize("/seller/x", Some("t"), Some("user")), redirect("/"));
        assert_eq!(authorize("/user/x", Some("t"), Some("seller")), redirect("/"));
        assert_eq!(authorize("/admin/x", Some("t"), Some("seller")), redirect("/"));
    }

    #[test]
    fn test_no_token_goes_to_namespace_login() {
        assert_eq!(authorize("/user/x", None, None), redirect("/login/user"));
        assert_eq!(authorize("/seller", Some(""), Some("seller")), redirect("/login/seller"));
        assert_eq!(authorize("/admin/a/b", None, Some("admin")), redirect("/login/admin"));
    }

    #[test]
    fn test_unprotected_paths_pass() {
        for path in ["/", "/login/user", "/users/x", "/shop/user", "", "user/x"] {
            assert_eq!(authorize(path, None, None), GateDecision::Allow, "{path}");
            assert_eq!(classify(path, None, None), None);
        }
    }

    #[test]
    fn test_unknown_login_type_mismatches() {
        assert_eq!(
            classify("/user/x", Some("t"), Some("User")),
            Some(GateState::RoleMismatchesPath)
        );
        assert_eq!(authorize("/user/x", Some("t"), None), redirect("/"));
    }

    #[test]
    fn test_namespace_ignores_query() {
        assert_eq!(Namespace::of_path("/seller?tab=orders"), Some(Namespace::Seller));
        assert_eq!(Namespace::of_path("/admin"), Some(Namespace::Admin));
    }

    #[test]
    fn test_role_source_parse() {
        assert_eq!(RoleSource::parse("cookie"), Some(RoleSource::Cookie));
        assert_eq!(RoleSource::parse(" Signed "), Some(RoleSource::SignedSession));
        assert_eq!(RoleSource::parse("header"), None);
    }

    #[test]
    fn test_signed_gate_ignores_forged_login_type() {
        let clock = test_clock();
        let signer = SessionSigner::new(b"secret", chrono::Duration::hours(1));
        let session = Session::from_entity("t".into(), Role::User, json!({}), None);
        let jwt = signer
            .issue(&session, &clock)
            .unwrap_or_else(|e| unreachable!("issue failed: {e}"));
        let gate = RouteGate::signed(signer);

        let forged = RequestCookies::parse([format!("token=t; loginType=admin; session={jwt}").as_str()]);
        assert_eq!(gate.decide("/admin/x", &forged, &clock), redirect("/"));
        assert_eq!(gate.decide("/user/x", &forged, &clock), GateDecision::Allow);

        let unsigned = RequestCookies::parse(["token=t; loginType=admin"]);
        assert_eq!(gate.decide("/admin/x", &unsigned, &clock), redirect("/login/admin"));
    }

    #[test]
    fn test_signed_gate_requires_matching_token() {
        let clock = test_clock();
        let signer = SessionSigner::new(b"secret", chrono::Duration::hours(1));
        let admin = Session::from_entity("admin-token".into(), Role::Admin, json!({}), None);
        let jwt = signer
            .issue(&admin, &clock)
            .unwrap_or_else(|e| unreachable!("issue failed: {e}"));
        let gate = RouteGate::signed(signer);

        let paired = RequestCookies::parse([format!("token=admin-token; session={jwt}").as_str()]);
        assert_eq!(gate.decide("/admin/x", &paired, &clock), GateDecision::Allow);

        let swapped = RequestCookies::parse([format!("token=user-token; session={jwt}").as_str()]);
        assert_eq!(gate.decide("/admin/x", &swapped, &clock), redirect("/login/admin"));

        let tokenless = RequestCookies::parse([format!("session={jwt}").as_str()]);
        assert_eq!(gate.decide("/admin/x", &tokenless, &clock), redirect("/login/admin"));
    }

    #[test]
    fn test_cookie_gate_trusts_login_type() {
        let cookies = RequestCookies::parse(["token=t; loginType=seller"]);
        let gate = RouteGate::default();
        assert_eq!(gate.role_source(), RoleSource::Cookie);
        assert_eq!(gate.decide("/seller/orders", &cookies, &test_clock()), GateDecision::Allow);
    }
}
