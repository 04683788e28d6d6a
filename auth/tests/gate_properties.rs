//! Property tests for the route authorization gate.

use proptest::prelude::*;
use verdant_auth::gate::{authorize, classify, GateDecision, GateState, Namespace};

/// Generates a protected namespace.
fn arb_namespace() -> impl Strategy<Value = Namespace> {
    prop::sample::select(Namespace::ALL.to_vec())
}

/// Generates the remainder of a path under a namespace.
fn arb_suffix() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "/[a-z0-9/-]{0,24}"]
}

/// Generates a `loginType` cookie value, including junk.
fn arb_login_type() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("user".to_string()),
        Just("seller".to_string()),
        Just("admin".to_string()),
        "[A-Za-z]{0,8}",
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: without a token every protected path goes to its own login page.
    #[test]
    fn prop_no_token_redirects_to_namespace_login(
        namespace in arb_namespace(),
        suffix in arb_suffix(),
        login_type in arb_login_type(),
        empty in any::<bool>(),
    ) {
        let path = format!("/{}{suffix}", namespace.as_str());
        let token = empty.then_some("");
        prop_assert_eq!(
            authorize(&path, token, login_type.as_deref()),
            GateDecision::Redirect(namespace.login_path())
        );
    }

    /// Property: an admin with a token is never redirected.
    #[test]
    fn prop_admin_always_allowed(
        namespace in arb_namespace(),
        suffix in arb_suffix(),
        token in "[A-Za-z0-9._-]{1,40}",
    ) {
        let path = format!("/{}{suffix}", namespace.as_str());
        prop_assert_eq!(authorize(&path, Some(&token), Some("admin")), GateDecision::Allow);
    }

    /// Property: a non-admin is allowed exactly in its own namespace, and
    /// otherwise sent home.
    #[test]
    fn prop_role_namespace_match(
        namespace in arb_namespace(),
        suffix in arb_suffix(),
        login_type in arb_login_type(),
    ) {
        prop_assume!(login_type.as_deref() != Some("admin"));
        let path = format!("/{}{suffix}", namespace.as_str());
        let decision = authorize(&path, Some("t"), login_type.as_deref());

        if login_type.as_deref() == Some(namespace.as_str()) {
            prop_assert_eq!(decision, GateDecision::Allow);
        } else {
            prop_assert_eq!(decision, GateDecision::Redirect("/".to_string()));
        }
    }

    /// Property: paths outside the three namespaces are never gated.
    #[test]
    fn prop_unprotected_paths_allowed(
        path in "/[a-z]{0,12}(/[a-z0-9]{0,8}){0,3}",
        login_type in arb_login_type(),
    ) {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or_default();
        prop_assume!(!["user", "seller", "admin"].contains(&first));
        prop_assert_eq!(authorize(&path, None, login_type.as_deref()), GateDecision::Allow);
        prop_assert_eq!(classify(&path, None, login_type.as_deref()), None);
    }

    /// Property: the decision agrees with the classified gate state.
    #[test]
    fn prop_decision_matches_state(
        namespace in arb_namespace(),
        token in prop::option::of("[a-z]{0,4}"),
        login_type in arb_login_type(),
    ) {
        let path = format!("/{}/page", namespace.as_str());
        let state = classify(&path, token.as_deref(), login_type.as_deref());
        let decision = authorize(&path, token.as_deref(), login_type.as_deref());
        let login = namespace.login_path();

        match state {
            Some(GateState::NoToken) => prop_assert_eq!(decision.location(), Some(login.as_str())),
            Some(GateState::RoleMatchesPath) => prop_assert_eq!(decision, GateDecision::Allow),
            Some(GateState::RoleMismatchesPath) => prop_assert_eq!(decision.location(), Some("/")),
            None => prop_assert!(false, "protected path classified as unprotected"),
        }
    }
}
