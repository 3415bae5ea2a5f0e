//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "page_category", rename_all = "snake_case")]
pub enum PageCategory {
    Main,
    Services,
    Blog,
    About,
    Contact,
    Other,
}

impl PageCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PageCategory::Main => "main",
            PageCategory::Services => "services",
            PageCategory::Blog => "blog",
            PageCategory::About => "about",
            PageCategory::Contact => "contact",
            PageCategory::Other => "other",
        }
    }
}

/// HTTP status code carried by a redirect. Only the four redirect codes the
/// panel issues are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectStatus {
    MovedPermanently,
    Found,
    TemporaryRedirect,
    PermanentRedirect,
}

impl RedirectStatus {
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::TemporaryRedirect => 307,
            RedirectStatus::PermanentRedirect => 308,
        }
    }
}

impl From<RedirectStatus> for u16 {
    fn from(status: RedirectStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u16> for RedirectStatus {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            301 => Ok(RedirectStatus::MovedPermanently),
            302 => Ok(RedirectStatus::Found),
            307 => Ok(RedirectStatus::TemporaryRedirect),
            308 => Ok(RedirectStatus::PermanentRedirect),
            other => Err(format!("`{other}` is not a supported redirect status")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Reset,
    BulkUpdate,
    BulkDelete,
    BulkReset,
    SlugChange,
    RedirectCreate,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Reset => "reset",
            AuditAction::BulkUpdate => "bulk_update",
            AuditAction::BulkDelete => "bulk_delete",
            AuditAction::BulkReset => "bulk_reset",
            AuditAction::SlugChange => "slug_change",
            AuditAction::RedirectCreate => "redirect_create",
        }
    }
}

impl TryFrom<&str> for AuditAction {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "reset" => Ok(AuditAction::Reset),
            "bulk_update" => Ok(AuditAction::BulkUpdate),
            "bulk_delete" => Ok(AuditAction::BulkDelete),
            "bulk_reset" => Ok(AuditAction::BulkReset),
            "slug_change" => Ok(AuditAction::SlugChange),
            "redirect_create" => Ok(AuditAction::RedirectCreate),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityType {
    SeoPage,
    Redirect,
}

impl AuditEntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditEntityType::SeoPage => "seo_page",
            AuditEntityType::Redirect => "redirect",
        }
    }
}

impl TryFrom<&str> for AuditEntityType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "seo_page" => Ok(AuditEntityType::SeoPage),
            "redirect" => Ok(AuditEntityType::Redirect),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_status_round_trips_through_code() {
        for status in [
            RedirectStatus::MovedPermanently,
            RedirectStatus::Found,
            RedirectStatus::TemporaryRedirect,
            RedirectStatus::PermanentRedirect,
        ] {
            assert_eq!(RedirectStatus::try_from(status.code()), Ok(status));
        }
    }

    #[test]
    fn redirect_status_rejects_non_redirect_codes() {
        assert!(RedirectStatus::try_from(200).is_err());
        assert!(RedirectStatus::try_from(404).is_err());
    }

    #[test]
    fn audit_action_str_round_trip() {
        let actions = [
            AuditAction::Create,
            AuditAction::BulkReset,
            AuditAction::SlugChange,
            AuditAction::RedirectCreate,
        ];
        for action in actions {
            assert_eq!(AuditAction::try_from(action.as_str()), Ok(action));
        }
    }
}
