use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::authentication::Error;
use crate::identity::Principal;

/// Ordered, non-empty list of the scheme names evaluated to produce a result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemeNames(Vec<String>);

impl SchemeNames {
    /// Builds a list of scheme names
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `names` is empty
    pub fn new<I, S>(names: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::InvalidArgument(
                "Authentication results must name at least one scheme".to_string(),
            ));
        }

        Ok(Self(names))
    }

    /// The first evaluated scheme
    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }
}

impl From<&str> for SchemeNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for SchemeNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<&String> for SchemeNames {
    fn from(name: &String) -> Self {
        Self(vec![name.clone()])
    }
}

impl<'a> IntoIterator for &'a SchemeNames {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Generic error used when a handler reports its failure as a plain message.
#[derive(Debug)]
struct FailureMessage(String);

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for FailureMessage {}

/// The reason an authentication attempt failed.
#[derive(Clone, Debug)]
pub struct AuthenticationFailure(Arc<dyn StdError + Send + Sync>);

impl AuthenticationFailure {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    pub fn message(&self) -> String {
        self.0.to_string()
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Display for AuthenticationFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AuthenticationFailure {
    fn from(message: &str) -> Self {
        Self::new(FailureMessage(message.to_string()))
    }
}

impl From<String> for AuthenticationFailure {
    fn from(message: String) -> Self {
        Self::new(FailureMessage(message))
    }
}

impl From<Box<dyn StdError + Send + Sync>> for AuthenticationFailure {
    fn from(error: Box<dyn StdError + Send + Sync>) -> Self {
        Self(Arc::from(error))
    }
}

#[derive(Clone, Debug)]
enum Outcome {
    Passed(Arc<dyn Principal>),
    Failed(AuthenticationFailure),
}

/// The outcome of authenticating a request with one or more schemes.
///
/// Bad or missing credentials are a failing result, not an `Err`: only `pass`, `fail`
/// and the validating `from_parts` can build one, so a passing result always carries
/// a user and a failing one always carries a failure.
#[derive(Clone, Debug)]
pub struct AuthenticationResult {
    outcome: Outcome,
    scheme_names: SchemeNames,
}

impl AuthenticationResult {
    pub fn pass(user: Arc<dyn Principal>, scheme_names: impl Into<SchemeNames>) -> Self {
        Self {
            outcome: Outcome::Passed(user),
            scheme_names: scheme_names.into(),
        }
    }

    pub fn fail(
        failure: impl Into<AuthenticationFailure>,
        scheme_names: impl Into<SchemeNames>,
    ) -> Self {
        Self {
            outcome: Outcome::Failed(failure.into()),
            scheme_names: scheme_names.into(),
        }
    }

    /// Rebuilds a result from loose fields, enforcing the pass/fail invariants
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if a failing result has no failure or a
    /// passing result has no user, or if the user and the failure are both given
    pub fn from_parts(
        passed: bool,
        scheme_names: impl Into<SchemeNames>,
        user: Option<Arc<dyn Principal>>,
        failure: Option<AuthenticationFailure>,
    ) -> Result<Self, Error> {
        let outcome = match (passed, user, failure) {
            (true, Some(user), None) => Outcome::Passed(user),
            (true, None, _) => {
                return Err(Error::InvalidArgument(
                    "Passing authentication results must specify a user".to_string(),
                ))
            }
            (true, Some(_), Some(_)) => {
                return Err(Error::InvalidArgument(
                    "Passing authentication results must not specify a failure reason"
                        .to_string(),
                ))
            }
            (false, None, Some(failure)) => Outcome::Failed(failure),
            (false, Some(_), Some(_)) => {
                return Err(Error::InvalidArgument(
                    "Failed authentication results must not specify a user".to_string(),
                ))
            }
            (false, _, None) => {
                return Err(Error::InvalidArgument(
                    "Failed authentication results must specify a failure reason".to_string(),
                ))
            }
        };

        Ok(Self {
            outcome,
            scheme_names: scheme_names.into(),
        })
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed(_))
    }

    pub fn scheme_names(&self) -> &SchemeNames {
        &self.scheme_names
    }

    pub fn user(&self) -> Option<&Arc<dyn Principal>> {
        match &self.outcome {
            Outcome::Passed(user) => Some(user),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AuthenticationFailure> {
        match &self.outcome {
            Outcome::Failed(failure) => Some(failure),
            Outcome::Passed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ClaimsPrincipal;

    #[derive(Debug)]
    struct ExpiredToken;

    impl fmt::Display for ExpiredToken {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "token expired")
        }
    }

    impl StdError for ExpiredToken {}

    fn build_user() -> Arc<dyn Principal> {
        Arc::new(ClaimsPrincipal::new("user-1"))
    }

    #[test]
    fn test_pass_sets_user_and_no_failure() {
        let user = build_user();
        let result = AuthenticationResult::pass(user.clone(), "cookie");

        assert!(result.passed());
        assert!(Arc::ptr_eq(result.user().unwrap(), &user));
        assert!(result.failure().is_none());
        assert_eq!(result.scheme_names().as_slice(), ["cookie".to_string()]);
    }

    #[test]
    fn test_pass_with_multiple_scheme_names() {
        let names = SchemeNames::new(["cookie", "token"]).unwrap();
        let result = AuthenticationResult::pass(build_user(), names);

        assert_eq!(result.scheme_names().len(), 2);
        assert_eq!(result.scheme_names().primary(), "cookie");
        assert!(result.scheme_names().contains("token"));
    }

    #[test]
    fn test_fail_wraps_message() {
        let result = AuthenticationResult::fail("Invalid credentials", "basic");

        assert!(!result.passed());
        assert!(result.user().is_none());
        assert_eq!(result.failure().unwrap().message(), "Invalid credentials");
        assert_eq!(result.scheme_names().as_slice(), ["basic".to_string()]);
    }

    #[test]
    fn test_fail_keeps_error_value() {
        let result = AuthenticationResult::fail(AuthenticationFailure::new(ExpiredToken), "token");

        let failure = result.failure().unwrap();
        assert!(failure.downcast_ref::<ExpiredToken>().is_some());
        assert_eq!(failure.to_string(), "token expired");
    }

    #[test]
    fn test_fail_with_boxed_error() {
        let error: Box<dyn StdError + Send + Sync> = Box::new(ExpiredToken);
        let result = AuthenticationResult::fail(error, "token");

        assert_eq!(result.failure().unwrap().message(), "token expired");
    }

    #[test]
    fn test_empty_scheme_names_rejected() {
        let names: Vec<String> = Vec::new();
        let error = SchemeNames::new(names).unwrap_err();

        assert!(matches!(error, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_from_parts_rejects_failure_without_reason() {
        let error = AuthenticationResult::from_parts(false, "cookie", None, None).unwrap_err();

        assert_eq!(
            error,
            Error::InvalidArgument(
                "Failed authentication results must specify a failure reason".to_string()
            )
        );
    }

    #[test]
    fn test_from_parts_rejects_pass_without_user() {
        let error = AuthenticationResult::from_parts(true, "cookie", None, None).unwrap_err();

        assert_eq!(
            error,
            Error::InvalidArgument("Passing authentication results must specify a user".to_string())
        );
    }

    #[test]
    fn test_from_parts_rejects_contradicting_parts() {
        let error = AuthenticationResult::from_parts(
            true,
            "cookie",
            Some(build_user()),
            Some("Denied".into()),
        )
        .unwrap_err();
        assert_eq!(
            error,
            Error::InvalidArgument(
                "Passing authentication results must not specify a failure reason".to_string()
            )
        );

        let error = AuthenticationResult::from_parts(
            false,
            "cookie",
            Some(build_user()),
            Some("Denied".into()),
        )
        .unwrap_err();
        assert_eq!(
            error,
            Error::InvalidArgument(
                "Failed authentication results must not specify a user".to_string()
            )
        );
    }

    #[test]
    fn test_from_parts_builds_valid_results() {
        let passed = AuthenticationResult::from_parts(true, "cookie", Some(build_user()), None);
        assert!(passed.unwrap().passed());

        let failed =
            AuthenticationResult::from_parts(false, "cookie", None, Some("Denied".into())).unwrap();
        assert!(!failed.passed());
        assert_eq!(failed.failure().unwrap().message(), "Denied");
    }
}
