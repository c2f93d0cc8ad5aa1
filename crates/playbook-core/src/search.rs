//! Mock search.
//!
//! Two static sources stand in for a search service:
//!
//! - [`mock_search`] serves the product catalog used by the side-by-side
//!   variant test. Variant `"B"` returns the same rows in reverse order.
//! - [`playground_search`] serves the per-service results shown in the
//!   playground, re-ranked from 1 after filtering.
//!
//! Query matching is a case-insensitive substring test on `CONTENT`. Neither
//! function can fail; the artificial latency lives with the async caller.

use serde::{Deserialize, Serialize};

use crate::filter::{self, Filter, LogicalOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Table,
    #[serde(rename = "PDF")]
    Pdf,
}

/// One contribution to a result's score, e.g. `CONTENT (text)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub rank: usize,
    #[serde(rename = "DOC_ID")]
    pub doc_id: String,
    #[serde(rename = "TITLE")]
    pub title: String,
    #[serde(rename = "CONTENT")]
    pub content: String,
    #[serde(rename = "CATEGORY")]
    pub category: String,
    #[serde(rename = "PRICE", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "RATING", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "DATE", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "REGION", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "AGENT_ID", default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(rename = "SOURCE_FILENAME", default, skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
    #[serde(rename = "PAGE_NUMBER", default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(rename = "SCORE", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub score_components: Vec<ScoreComponent>,
}

impl ResultRow {
    fn product(rank: usize, title: &str, doc_id: &str, price: f64, rating: f64) -> Self {
        Self {
            rank,
            doc_id: doc_id.to_string(),
            title: title.to_string(),
            content: title.to_string(),
            category: "Electronics".to_string(),
            price: Some(price),
            rating: Some(rating),
            date: None,
            region: None,
            agent_id: None,
            source_filename: None,
            page_number: None,
            score: None,
            source_type: None,
            score_components: Vec::new(),
        }
    }

    /// Display value of an uppercase column, `None` when the row has none.
    pub fn column(&self, name: &str) -> Option<String> {
        match name {
            "DOC_ID" => Some(self.doc_id.clone()),
            "TITLE" => Some(self.title.clone()),
            "CONTENT" => Some(self.content.clone()),
            "CATEGORY" => Some(self.category.clone()),
            "PRICE" => self.price.map(|p| p.to_string()),
            "RATING" => self.rating.map(|r| r.to_string()),
            "DATE" => self.date.clone(),
            "REGION" => self.region.clone(),
            "AGENT_ID" => self.agent_id.clone(),
            "SOURCE_FILENAME" => self.source_filename.clone(),
            "PAGE_NUMBER" => self.page_number.map(|p| p.to_string()),
            _ => None,
        }
    }

    /// The provenance line shown above a playground result.
    pub fn source_label(&self) -> String {
        let na = || "N/A".to_string();
        match self.source_type {
            Some(SourceKind::Pdf) => format!(
                "Source: {} (Page {})",
                self.source_filename.clone().unwrap_or_else(na),
                self.page_number.map(|p| p.to_string()).unwrap_or_else(na)
            ),
            _ => format!("AGENT_ID: {}", self.agent_id.clone().unwrap_or_else(na)),
        }
    }

    /// Each score component with its share of the component total.
    pub fn explain(&self) -> Vec<(String, f64, f64)> {
        let sum: f64 = self.score_components.iter().map(|c| c.value).sum();
        let total = if sum == 0.0 { 1.0 } else { sum };
        self.score_components
            .iter()
            .map(|c| (c.name.clone(), c.value, c.value / total))
            .collect()
    }
}

/// Search request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub logical_op: LogicalOp,
}

fn default_limit() -> usize {
    10
}

impl SearchParams {
    pub fn new(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            limit,
            filters: Vec::new(),
            logical_op: LogicalOp::And,
        }
    }

    fn admits(&self, row: &ResultRow) -> bool {
        let query_ok = self.query.is_empty()
            || row
                .content
                .to_lowercase()
                .contains(&self.query.to_lowercase());
        query_ok && filter::matches_all(&self.filters, self.logical_op, row)
    }
}

/// The product catalog behind the variant comparison.
pub fn product_rows() -> Vec<ResultRow> {
    vec![
        ResultRow::product(1, "Dell Sony WH-1000XM5 Headphones", "doc_776_251ead9f", 1609.0, 3.7),
        ResultRow::product(2, "Dell Samsung Galaxy Phone", "doc_1403_8a0bfb65", 1388.0, 4.2),
        ResultRow::product(3, "Dell Sennheiser HD Headphones", "doc_1022_1ce5f16b", 1155.0, 4.5),
        ResultRow::product(4, "Dell Samsung Galaxy Watch Watch", "doc_298_9a7a4f22", 1270.0, 4.4),
    ]
}

/// Search the product catalog. Rows keep their catalog rank.
pub fn mock_search(params: &SearchParams, variant: &str) -> Vec<ResultRow> {
    let mut rows = product_rows();
    if variant == "B" {
        rows.reverse();
    }
    rows.into_iter()
        .filter(|r| params.admits(r))
        .take(params.limit)
        .collect()
}

// ============ Playground ============

pub const CUSTOMER_SUPPORT_SERVICE: &str = "CHAT_CUSTOMER_TEST_CSS_A";
pub const FINANCIAL_DOCS_SERVICE: &str = "CHAT_CUSTOMER_TEST_CSS_B";

/// Services selectable in the playground.
pub const AVAILABLE_SERVICES: &[&str] = &[
    "CHAT_CUSTOMER_TEST_CSS_A",
    "CHAT_CUSTOMER_TEST_CSS_B",
    "PRODUCT_CATALOG_V1",
    "FINANCIAL_DOCS_SERVICE",
];

/// Columns shown on result cards until the user picks others.
pub const DEFAULT_DISPLAY_COLUMNS: &[&str] = &["TITLE", "CONTENT"];

/// Heading shown above a service's results.
pub fn service_title(service: &str) -> &'static str {
    if service == CUSTOMER_SUPPORT_SERVICE {
        "Customer Support Search"
    } else {
        "Financial Document Search"
    }
}

fn components(entries: &[(&str, f64)]) -> Vec<ScoreComponent> {
    entries
        .iter()
        .map(|(name, value)| ScoreComponent {
            name: name.to_string(),
            value: *value,
        })
        .collect()
}

fn support_rows() -> Vec<ResultRow> {
    vec![
        ResultRow {
            rank: 1,
            doc_id: "dke9o01345".to_string(),
            title: "Customer inquiry about pricing".to_string(),
            content: "The customer is asking about the pricing for our enterprise plan. They want to know the per-seat cost and any available discounts.".to_string(),
            category: "Sales".to_string(),
            price: Some(100.0),
            rating: Some(4.5),
            date: Some("2024-05-20".to_string()),
            region: Some("US".to_string()),
            agent_id: Some("dke9o01345".to_string()),
            source_filename: None,
            page_number: None,
            score: Some(0.92),
            source_type: Some(SourceKind::Table),
            score_components: components(&[
                ("CONTENT (text)", 0.7),
                ("TITLE (text)", 0.2),
                ("RATING (boost)", 0.02),
            ]),
        },
        ResultRow {
            rank: 2,
            doc_id: "ppa8b92134".to_string(),
            title: "Billing issue escalation".to_string(),
            content: "A customer is reporting a double charge on their last invoice. We need to investigate and issue a refund if necessary.".to_string(),
            category: "Billing".to_string(),
            price: Some(50.0),
            rating: Some(2.8),
            date: Some("2024-05-19".to_string()),
            region: Some("EU".to_string()),
            agent_id: Some("ppa8b92134".to_string()),
            source_filename: None,
            page_number: None,
            score: Some(0.87),
            source_type: Some(SourceKind::Table),
            score_components: components(&[
                ("CONTENT (text)", 0.65),
                ("TITLE (text)", 0.15),
                ("RATING (boost)", 0.07),
            ]),
        },
    ]
}

fn document_rows() -> Vec<ResultRow> {
    vec![
        ResultRow {
            rank: 1,
            doc_id: "doc-xyz-789".to_string(),
            title: "Financial_Report_Q1_2024.pdf".to_string(),
            content: "The company's net revenue increased by 15% year-over-year, driven by strong performance in the cloud services division.".to_string(),
            category: "Finance".to_string(),
            price: None,
            rating: None,
            date: Some("2024-04-25".to_string()),
            region: Some("Global".to_string()),
            agent_id: None,
            source_filename: Some("Financial_Report_Q1_2024.pdf".to_string()),
            page_number: Some(12),
            score: Some(0.95),
            source_type: Some(SourceKind::Pdf),
            score_components: components(&[
                ("CONTENT (vector)", 0.8),
                ("TITLE (text)", 0.1),
                ("freshness (decay)", 0.05),
            ]),
        },
        ResultRow {
            rank: 2,
            doc_id: "doc-abc-123".to_string(),
            title: "Marketing_Strategy_2025.pdf".to_string(),
            content: "Our new marketing campaign will focus on social media engagement and influencer partnerships to target a younger demographic.".to_string(),
            category: "Marketing".to_string(),
            price: None,
            rating: None,
            date: Some("2024-05-10".to_string()),
            region: Some("Global".to_string()),
            agent_id: None,
            source_filename: Some("Marketing_Strategy_2025.pdf".to_string()),
            page_number: Some(2),
            score: Some(0.81),
            source_type: Some(SourceKind::Pdf),
            score_components: components(&[
                ("CONTENT (vector)", 0.7),
                ("TITLE (text)", 0.05),
                ("freshness (decay)", 0.06),
            ]),
        },
    ]
}

/// Search one playground service. Results are ranked from 1 in the order
/// they survive filtering.
pub fn playground_search(service: &str, params: &SearchParams) -> Vec<ResultRow> {
    let rows = if service == FINANCIAL_DOCS_SERVICE {
        document_rows()
    } else {
        support_rows()
    };
    rows.into_iter()
        .filter(|r| params.admits(r))
        .take(params.limit)
        .enumerate()
        .map(|(i, mut r)| {
            r.rank = i + 1;
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOp;

    #[test]
    fn test_mock_search_all() {
        let rows = mock_search(&SearchParams::new("", 10), "A");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].doc_id, "doc_776_251ead9f");
    }

    #[test]
    fn test_variant_b_reverses() {
        let rows = mock_search(&SearchParams::new("", 10), "B");
        assert_eq!(rows[0].doc_id, "doc_298_9a7a4f22");
        assert_eq!(rows[3].doc_id, "doc_776_251ead9f");
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let rows = mock_search(&SearchParams::new("HEADPHONES", 10), "A");
        assert_eq!(rows.len(), 2);
        let rows = mock_search(&SearchParams::new("galaxy", 1), "B");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Dell Samsung Galaxy Watch Watch");
    }

    #[test]
    fn test_limit_zero() {
        assert!(mock_search(&SearchParams::new("", 0), "A").is_empty());
    }

    #[test]
    fn test_playground_service_routing() {
        let params = SearchParams::new("", 10);
        let support = playground_search("CHAT_CUSTOMER_TEST_CSS_A", &params);
        assert_eq!(support[0].doc_id, "dke9o01345");
        let docs = playground_search("CHAT_CUSTOMER_TEST_CSS_B", &params);
        assert_eq!(docs[0].doc_id, "doc-xyz-789");
        let other = playground_search("PRODUCT_CATALOG_V1", &params);
        assert_eq!(other[0].doc_id, "dke9o01345");
    }

    #[test]
    fn test_playground_reranks_after_filtering() {
        let params = SearchParams::new("refund", 10);
        let rows = playground_search(CUSTOMER_SUPPORT_SERVICE, &params);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doc_id, "ppa8b92134");
        assert_eq!(rows[0].rank, 1);
    }

    #[test]
    fn test_filters_apply_to_rows() {
        let mut params = SearchParams::new("", 10);
        params.filters = vec![Filter::new("RATING", FilterOp::Gte, "4")];
        let rows = playground_search(CUSTOMER_SUPPORT_SERVICE, &params);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Sales");

        params.filters = vec![Filter::new("CATEGORY", FilterOp::Eq, "Sales").negated()];
        let rows = playground_search(CUSTOMER_SUPPORT_SERVICE, &params);
        assert_eq!(rows[0].category, "Billing");
    }

    #[test]
    fn test_source_labels() {
        let params = SearchParams::new("", 10);
        let docs = playground_search(FINANCIAL_DOCS_SERVICE, &params);
        assert_eq!(
            docs[0].source_label(),
            "Source: Financial_Report_Q1_2024.pdf (Page 12)"
        );
        let support = playground_search(CUSTOMER_SUPPORT_SERVICE, &params);
        assert_eq!(support[0].source_label(), "AGENT_ID: dke9o01345");
    }

    #[test]
    fn test_explain_shares() {
        let params = SearchParams::new("", 10);
        let row = &playground_search(CUSTOMER_SUPPORT_SERVICE, &params)[0];
        let parts = row.explain();
        assert_eq!(parts.len(), 3);
        let total: f64 = parts.iter().map(|(_, _, share)| share).sum();
        assert!((total - 1.0).abs() < 1e-9);

        let product = &mock_search(&SearchParams::new("", 1), "A")[0];
        assert!(product.explain().is_empty());
    }

    #[test]
    fn test_service_titles() {
        assert_eq!(service_title("CHAT_CUSTOMER_TEST_CSS_A"), "Customer Support Search");
        assert_eq!(service_title("CHAT_CUSTOMER_TEST_CSS_B"), "Financial Document Search");
    }
}
