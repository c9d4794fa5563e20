use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identity stored in the signed session cookie after a successful login.
///
/// Every field except the display name may be absent because the users
/// table is discovered at runtime and may lack the matching column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Option<i64>,
    pub email: Option<String>,
    pub name: String,
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        user_id: Option<i64>,
        email: Option<String>,
        name: impl Into<String>,
        role: Option<String>,
        duration_secs: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id,
            email,
            name: name.into(),
            role,
            iat: now,
            exp: now + duration_secs,
        }
    }
}

/// Where a freshly authenticated user is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingPage {
    AdminDashboard,
    PortalDashboard,
}

impl LandingPage {
    /// Administrators (role name `administrador`, any casing) land on the
    /// admin dashboard, everybody else on the guest portal.
    pub fn for_role(role: Option<&str>) -> Self {
        match role {
            Some(name) if name.trim().eq_ignore_ascii_case("administrador") => Self::AdminDashboard,
            _ => Self::PortalDashboard,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::AdminDashboard => "/admin-dashboard.html",
            Self::PortalDashboard => "/portal-dashboard.html",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrador_lands_on_admin_dashboard() {
        assert_eq!(LandingPage::for_role(Some("Administrador")), LandingPage::AdminDashboard);
        assert_eq!(LandingPage::for_role(Some("ADMINISTRADOR")), LandingPage::AdminDashboard);
        assert_eq!(LandingPage::AdminDashboard.path(), "/admin-dashboard.html");
    }

    #[test]
    fn other_roles_land_on_portal() {
        assert_eq!(LandingPage::for_role(Some("Cliente")), LandingPage::PortalDashboard);
        assert_eq!(LandingPage::for_role(Some("admin")), LandingPage::PortalDashboard);
        assert_eq!(LandingPage::for_role(None), LandingPage::PortalDashboard);
    }

    #[test]
    fn claims_window_follows_ttl() {
        let claims = SessionClaims::new(Some(1), None, "Ana", Some("Cliente".into()), 60);
        assert_eq!(claims.exp - claims.iat, 60);
        assert_eq!(claims.name, "Ana");
    }
}
