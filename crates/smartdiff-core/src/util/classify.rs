//! Heuristic content-type labels for lines of extracted text.
//!
//! Labels only bias matching in the aligner; they are never ground truth.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    FinancialSubtotal,
    FinancialTax,
    FinancialTotal,
    FinancialItemPrice,
    FinancialLineItem,
    Header,
    Contact,
    Date,
    Label,
    Content,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::FinancialSubtotal => "financial_subtotal",
            ContentType::FinancialTax => "financial_tax",
            ContentType::FinancialTotal => "financial_total",
            ContentType::FinancialItemPrice => "financial_item_price",
            ContentType::FinancialLineItem => "financial_line_item",
            ContentType::Header => "header",
            ContentType::Contact => "contact",
            ContentType::Date => "date",
            ContentType::Label => "label",
            ContentType::Content => "content",
        }
    }

    pub fn is_financial(self) -> bool {
        matches!(
            self,
            ContentType::FinancialSubtotal
                | ContentType::FinancialTax
                | ContentType::FinancialTotal
                | ContentType::FinancialItemPrice
                | ContentType::FinancialLineItem
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CURRENCY_AMOUNT: &str = r"(?:[$€£¥]\s?-?\d[\d,]*(?:\.\d{1,2})?|-?\d[\d,]*\.\d{2})";

static SUBTOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*sub[\s-]?total\b.*\d").expect("valid regex"));

static TAX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:tax|vat|gst|hst)\b.*\d").expect("valid regex")
});

static TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:grand|invoice)\s+)?(?:total|amount\s+due|balance\s+due)\b.*\d")
        .expect("valid regex")
});

static ITEM_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\b(?:unit\s+price|price|rate|cost|each)\b.*|@\s*){}",
        CURRENCY_AMOUNT
    ))
    .expect("valid regex")
});

static LINE_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:^\s*(?:item|qty|quantity|product|service|\d+\s*x)\b.*\d|\S\s+{}\s*$)",
        CURRENCY_AMOUNT
    ))
    .expect("valid regex")
});

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\d+(?:\.\d+)*[.)]?\s+\S|(?:section|chapter|part|article|appendix)\s+[0-9ivxlc]+\b)",
    )
    .expect("valid regex")
});

static CONTACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:name|address|phone|tel|telephone|mobile|fax|e-?mail|contact)\b")
        .expect("valid regex")
});

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b\d{4}-\d{2}-\d{2}\b").expect("valid regex")
});

static LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9 &/:.\-]{0,29}$").expect("valid regex"));

/// Label a line of text. Patterns are checked in priority order and the
/// first match wins.
pub fn classify(text: &str) -> ContentType {
    let checks: [(&Lazy<Regex>, ContentType); 8] = [
        (&SUBTOTAL, ContentType::FinancialSubtotal),
        (&TAX, ContentType::FinancialTax),
        (&TOTAL, ContentType::FinancialTotal),
        (&ITEM_PRICE, ContentType::FinancialItemPrice),
        (&LINE_ITEM, ContentType::FinancialLineItem),
        (&HEADER, ContentType::Header),
        (&CONTACT, ContentType::Contact),
        (&DATE, ContentType::Date),
    ];

    for (pattern, content_type) in checks {
        if pattern.is_match(text) {
            return content_type;
        }
    }

    if LABEL.is_match(text.trim()) {
        return ContentType::Label;
    }

    ContentType::Content
}

/// Score bonus when both sides carry the same specific label.
///
/// Generic `content` never earns a bonus; the result is capped at 1.0.
pub fn apply_content_bonus(score: f64, a: ContentType, b: ContentType, bonus: f64) -> f64 {
    if a == b && a != ContentType::Content {
        (score + bonus).min(1.0)
    } else {
        score
    }
}
