//! Static HTML pages with a handful of named placeholders.
//!
//! Templates are handlebars files under the template directory. Values are
//! HTML-escaped by the engine and placeholders with no value render empty.

use std::collections::BTreeMap;
use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use grace_shared::errors::{AppError, ErrorCode};

pub const NOT_FOUND_PAGE: &str = "404";

/// Every page the site serves, without the `.html` suffix.
pub const PAGES: &[&str] = &[
    "about",
    "admin-audit",
    "admin-calendario",
    "admin-channels",
    "admin-dashboard",
    "admin-hotel",
    "admin-rates",
    "admin-reserva-detalle",
    "admin-reservas-dashboard",
    "admin-reservas-list",
    "admin-rooms",
    "admin-taxes",
    "admin-users",
    "amenities",
    "booking-checkout",
    "booking-confirmation",
    "booking-details",
    "booking-results",
    "booking-search",
    "booking",
    "contact",
    "events",
    "fin-close",
    "fin-dashboard",
    "fin-invoices",
    "fin-payments",
    "forgot-password",
    "gallery",
    "index",
    "location",
    "login",
    "offers",
    "ops-arrivals-departures",
    "ops-dashboard",
    "ops-housekeeping",
    "ops-incidents",
    "ops-inventory",
    "ops-maintenance",
    "ops-reports",
    "ops-rooms-status",
    "ops-shift-log",
    "portal-dashboard",
    "portal-facturas",
    "portal-pagos",
    "portal-perfil",
    "portal-preferencias",
    "portal-reserva-detalle",
    "portal-reservas",
    "portal-soporte",
    "privacy",
    "register",
    "restaurant",
    "room-details",
    "rooms",
    "starter-page",
    "terms",
];

pub fn is_known_page(name: &str) -> bool {
    PAGES.contains(&name)
}

/// Values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageContext {
    values: BTreeMap<&'static str, String>,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn with_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }
}

/// Reads `<dir>/<page>.html` and renders it.
pub async fn render(dir: &Path, page: &str, ctx: &PageContext) -> Result<String, AppError> {
    let path = dir.join(format!("{page}.html"));
    let template = tokio::fs::read_to_string(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "template unreadable");
        AppError::new(ErrorCode::TemplateUnavailable, format!("page {page} is unavailable"))
    })?;
    render_template(page, &template, ctx)
}

/// Renders one template source against `ctx`.
pub fn render_template(name: &str, source: &str, ctx: &PageContext) -> Result<String, AppError> {
    let unavailable = || AppError::new(ErrorCode::TemplateUnavailable, format!("page {name} is unavailable"));

    let mut handlebars = Handlebars::new();
    handlebars.register_template_string(name, source).map_err(|e| {
        tracing::error!(template = name, error = %e, "template does not parse");
        unavailable()
    })?;
    handlebars.render(name, ctx).map_err(|e| {
        tracing::error!(template = name, error = %e, "template failed to render");
        unavailable()
    })
}

const REGISTRATION_SUCCESS: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="3;url=/login.html">
<title>Registro exitoso | Hotel Villa Grace</title>
</head>
<body>
<main style="font-family: sans-serif; text-align: center; padding: 4rem 1rem;">
<h1>¡Registro exitoso!</h1>
<p>Bienvenido, {{ display_name }}. Serás redirigido al inicio de sesión en unos segundos.</p>
<p><a href="/login.html">Ir al inicio de sesión</a></p>
</main>
</body>
</html>
"#;

/// Shown after a successful registration; hands over to the login page.
pub fn registration_success(display_name: &str) -> Result<String, AppError> {
    let ctx = PageContext::new().with("display_name", display_name);
    render_template("registration-success", REGISTRATION_SUCCESS, &ctx)
}
