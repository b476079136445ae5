//! Server-rendered pages. Every page but the login form sits behind the token gate.

use crate::config::BookingLink;
use crate::handlers::auth::{NAME_COOKIE, USER_COOKIE};
use crate::models::{dashboard_menu, MenuItem, Reader};
use crate::utils::{display_email, initials, to_title_case};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::Uri,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use service_core::error::AppError;

/// Signed-in user as shown in the page header.
#[derive(Debug, Clone, Default)]
pub struct HeaderView {
    pub name: String,
    pub email: String,
    pub initials: String,
}

impl HeaderView {
    pub fn from_cookies(jar: &CookieJar) -> Self {
        let name = jar
            .get(NAME_COOKIE)
            .map(|c| to_title_case(c.value().trim()))
            .unwrap_or_default();
        let email = jar
            .get(USER_COOKIE)
            .map(|c| display_email(c.value()))
            .unwrap_or_default();

        Self {
            initials: initials(&name),
            name,
            email,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Crumb {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

fn segment_label(segment: &str) -> Option<&'static str> {
    match segment {
        "ai-page" => Some("AI Tools"),
        "order-manually" => Some("Manual Booking"),
        other => Reader::from_slug(other).map(|reader| reader.label()),
    }
}

/// Home, then AI Tools for reader pages, then one crumb per labelled segment.
pub fn breadcrumbs(path: &str) -> Vec<Crumb> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut crumbs = vec![Crumb {
        label: "Home",
        href: "/pages/dashboard".to_string(),
        active: false,
    }];

    if segments.iter().any(|s| Reader::from_slug(s).is_some()) {
        crumbs.push(Crumb {
            label: "AI Tools",
            href: "/pages/ai-page".to_string(),
            active: false,
        });
    }

    let mut current = String::new();
    for (index, segment) in segments.iter().enumerate() {
        current.push('/');
        current.push_str(segment);
        if let Some(label) = segment_label(segment) {
            crumbs.push(Crumb {
                label,
                href: current.clone(),
                active: index == segments.len() - 1,
            });
        }
    }

    crumbs
}

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub header: HeaderView,
    pub crumbs: Vec<Crumb>,
    pub menu: Vec<MenuItem>,
}

pub async fn dashboard_page(uri: Uri, jar: CookieJar) -> impl IntoResponse {
    DashboardTemplate {
        header: HeaderView::from_cookies(&jar),
        crumbs: breadcrumbs(uri.path()),
        menu: dashboard_menu(),
    }
}

#[derive(Template)]
#[template(path = "pages/order_manually.html")]
pub struct OrderManuallyTemplate {
    pub header: HeaderView,
    pub crumbs: Vec<Crumb>,
    pub links: Vec<BookingLink>,
}

pub async fn order_manually_page(
    State(state): State<AppState>,
    uri: Uri,
    jar: CookieJar,
) -> impl IntoResponse {
    OrderManuallyTemplate {
        header: HeaderView::from_cookies(&jar),
        crumbs: breadcrumbs(uri.path()),
        links: state.settings.links.manual_booking.clone(),
    }
}

#[derive(Template)]
#[template(path = "pages/ai_page.html")]
pub struct AiPageTemplate {
    pub header: HeaderView,
    pub crumbs: Vec<Crumb>,
    pub readers: Vec<Reader>,
}

pub async fn ai_page(uri: Uri, jar: CookieJar) -> impl IntoResponse {
    AiPageTemplate {
        header: HeaderView::from_cookies(&jar),
        crumbs: breadcrumbs(uri.path()),
        readers: Reader::ALL.to_vec(),
    }
}

#[derive(Template)]
#[template(path = "pages/reader.html")]
pub struct ReaderTemplate {
    pub header: HeaderView,
    pub crumbs: Vec<Crumb>,
    pub reader: Reader,
    pub max_upload: String,
}

impl ReaderTemplate {
    pub fn takes_text(&self) -> bool {
        matches!(self.reader, Reader::Text | Reader::Voice)
    }

    pub fn takes_file(&self) -> bool {
        self.reader != Reader::Text
    }

    /// Multipart field name the API endpoint expects for the upload.
    pub fn file_field(&self) -> &'static str {
        match self.reader {
            Reader::Text | Reader::Screenshot => "screenshot",
            Reader::Pdf => "pdf",
            Reader::Voice => "audio",
        }
    }

    pub fn accept(&self) -> &'static str {
        match self.reader {
            Reader::Text | Reader::Screenshot => "image/*",
            Reader::Pdf => "application/pdf",
            Reader::Voice => "audio/*",
        }
    }
}

pub async fn reader_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    uri: Uri,
    jar: CookieJar,
) -> Result<ReaderTemplate, AppError> {
    let reader = Reader::from_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("No page named {}", slug)))?;

    let uploads = &state.settings.uploads;
    let max_bytes = match reader {
        Reader::Text | Reader::Screenshot => uploads.max_screenshot_bytes,
        Reader::Pdf => uploads.max_pdf_bytes,
        Reader::Voice => uploads.max_audio_bytes,
    };

    Ok(ReaderTemplate {
        header: HeaderView::from_cookies(&jar),
        crumbs: breadcrumbs(uri.path()),
        reader,
        max_upload: crate::handlers::upload::megabytes(max_bytes),
    })
}
