/// Where a dashboard card leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Opens in a new tab.
    External,
    Internal,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub kind: LinkKind,
}

impl MenuItem {
    pub fn is_external(&self) -> bool {
        self.kind == LinkKind::External
    }
}

pub fn dashboard_menu() -> Vec<MenuItem> {
    vec![
        MenuItem {
            title: "Go to Zoho Books",
            description: "Access your Zoho Books accounting platform",
            url: "https://accounts.zoho.com/signin?servicename=ZohoBooks&signupurl=https://www.zoho.com%2fin/books/signup/",
            kind: LinkKind::External,
        },
        MenuItem {
            title: "Go to Quick Books",
            description: "Navigate to your QuickBooks dashboard",
            url: "https://accounts.intuit.com/app/sign-in?app_group=QBO&asset_alias=Intuit.accounting.core.qbowebapp&locale=en-ROW&app_environment=prod",
            kind: LinkKind::External,
        },
        MenuItem {
            title: "Book an Order Manually",
            description: "Create and manage orders manually",
            url: "/pages/order-manually",
            kind: LinkKind::Internal,
        },
        MenuItem {
            title: "Check Zoho Reports",
            description: "View detailed analytics and reports",
            url: "https://reports.zoho.com",
            kind: LinkKind::External,
        },
        MenuItem {
            title: "Let AI Book My Order",
            description: "Use AI assistance to automate order booking",
            url: "/pages/ai-page",
            kind: LinkKind::Internal,
        },
    ]
}

/// One of the AI order readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reader {
    Text,
    Screenshot,
    Pdf,
    Voice,
}

impl Reader {
    pub const ALL: [Reader; 4] = [Reader::Text, Reader::Screenshot, Reader::Pdf, Reader::Voice];

    pub fn title(&self) -> &'static str {
        match self {
            Reader::Text => "Text Message Reader",
            Reader::Screenshot => "Screenshot Reader",
            Reader::Pdf => "PDF Reader",
            Reader::Voice => "Voice Recording Reader",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Reader::Text => "Enter invoice details here...",
            Reader::Screenshot => "Upload screenshot of invoice or proof",
            Reader::Pdf => "Upload PDF invoice or attachment",
            Reader::Voice => "Record or upload voice notes for invoice detail",
        }
    }

    /// Page slug under `/pages/`.
    pub fn slug(&self) -> &'static str {
        match self {
            Reader::Text => "po-sms-text",
            Reader::Screenshot => "po-sms-screenshot",
            Reader::Pdf => "upload-pdf",
            Reader::Voice => "upload-voice",
        }
    }

    pub fn page_path(&self) -> String {
        format!("/pages/{}", self.slug())
    }

    /// Breadcrumb label.
    pub fn label(&self) -> &'static str {
        match self {
            Reader::Text => "SMS Text Processing",
            Reader::Screenshot => "SMS Screenshot Processing",
            Reader::Pdf => "PDF Upload",
            Reader::Voice => "Voice Upload",
        }
    }

    /// API endpoint the reader form submits to.
    pub fn action(&self) -> &'static str {
        match self {
            Reader::Text | Reader::Screenshot => "/api/process-sms",
            Reader::Pdf => "/api/upload-process-pdf",
            Reader::Voice => "/api/voice",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Reader> {
        Reader::ALL.into_iter().find(|reader| reader.slug() == slug)
    }
}
