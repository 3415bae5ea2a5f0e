//! Authorization collaborator.
//!
//! Credential handling lives outside this crate; callers hand every
//! operation a [`Principal`] describing who is acting and what they may
//! do. The scope check always runs before any other validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoScope {
    SeoRead,
    SeoWrite,
    SeoDelete,
}

impl SeoScope {
    pub fn as_str(self) -> &'static str {
        match self {
            SeoScope::SeoRead => "seo:read",
            SeoScope::SeoWrite => "seo:write",
            SeoScope::SeoDelete => "seo:delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn grants(self, scope: SeoScope) -> bool {
        match self {
            Role::Viewer => matches!(scope, SeoScope::SeoRead),
            Role::Editor => matches!(scope, SeoScope::SeoRead | SeoScope::SeoWrite),
            Role::Admin => true,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

#[derive(Debug, Error)]
#[error("actor `{actor}` lacks scope `{scope}`")]
pub struct AccessDenied {
    pub actor: String,
    pub scope: &'static str,
}

/// The acting identity attached to a request.
#[derive(Debug, Clone)]
pub struct Principal {
    actor: String,
    role: Role,
}

impl Principal {
    pub fn new(actor: impl Into<String>, role: Role) -> Self {
        Self {
            actor: actor.into(),
            role,
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Require a scope, returning the actor id for audit attribution.
    pub fn requires(&self, scope: SeoScope) -> Result<&str, AccessDenied> {
        if self.role.grants(scope) {
            Ok(&self.actor)
        } else {
            Err(AccessDenied {
                actor: self.actor.clone(),
                scope: scope.as_str(),
            })
        }
    }
}
