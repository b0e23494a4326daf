use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;

/// Well-known claim types.
pub mod claim_type {
    pub const SUBJECT: &str = "sub";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
}

/// A single statement about a principal, made by an issuer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Claim {
    pub claim_type: String,
    pub value: Value,
    pub issuer: String,
}

impl Claim {
    pub fn new(
        claim_type: impl Into<String>,
        value: impl Into<Value>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            issuer: issuer.into(),
        }
    }
}

/// The authenticated subject handed back by scheme handlers.
///
/// Handlers are free to bring their own representation; the pipeline only
/// relies on the subject identifier and its claims.
pub trait Principal: Debug + Send + Sync {
    /// The subject identifier, if the principal carries one
    fn id(&self) -> Option<&str>;

    /// Every claim made about this principal
    fn claims(&self) -> &[Claim];

    fn find_claims(&self, claim_type: &str) -> Vec<&Claim> {
        self.claims()
            .iter()
            .filter(|claim| claim.claim_type == claim_type)
            .collect()
    }

    fn has_claim(&self, claim_type: &str, value: &Value) -> bool {
        self.claims()
            .iter()
            .any(|claim| claim.claim_type == claim_type && &claim.value == value)
    }

    fn has_role(&self, role: &str) -> bool {
        self.has_claim(claim_type::ROLE, &Value::String(role.to_string()))
    }
}

/// Claims-based principal.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ClaimsPrincipal {
    id: Option<String>,
    claims: Vec<Claim>,
}

impl ClaimsPrincipal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            claims: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Folds another principal into this one.
    ///
    /// The first known subject identifier is kept; claims already present are not duplicated.
    pub fn merge(&mut self, other: &dyn Principal) {
        if self.id.is_none() {
            self.id = other.id().map(ToString::to_string);
        }

        for claim in other.claims() {
            if !self.claims.contains(claim) {
                self.claims.push(claim.clone());
            }
        }
    }
}

impl Principal for ClaimsPrincipal {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn claims(&self) -> &[Claim] {
        &self.claims
    }
}
