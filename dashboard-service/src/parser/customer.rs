use super::is_name_line;

pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

const BUSINESS_KEYWORDS: &[&str] = &["wines", "liquor", "spirits", "beverages", "total", "abc"];

/// Customer name from the first non-blank line if it is a bare name, else the
/// first line mentioning a business keyword, else [`UNKNOWN_CUSTOMER`].
pub fn extract_customer_name(text: &str) -> String {
    let first_line = text.lines().map(str::trim).find(|line| !line.is_empty());

    if let Some(line) = first_line {
        if is_name_line(line) {
            return line.to_string();
        }
    }

    text.lines()
        .find(|line| {
            let lower = line.to_lowercase();
            BUSINESS_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        })
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string())
}
