//! The results playground: query mock services, compare them side by side,
//! and inspect the filter object and score breakdown for each result.

use anyhow::{bail, Result};
use playbook_core::filter::{build_filter, Filter, LogicalOp};
use playbook_core::search::{
    mock_search, playground_search, service_title, ResultRow, SearchParams, AVAILABLE_SERVICES,
    DEFAULT_DISPLAY_COLUMNS,
};
use serde::Serialize;
use std::time::Duration;

use crate::config::{Config, PlaygroundConfig};

/// Most services shown side by side in one comparison.
pub const MAX_COMPARED_SERVICES: usize = 3;

/// Results of one service in a (possibly side-by-side) query.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResults {
    pub service: String,
    pub title: String,
    pub results: Vec<ResultRow>,
}

async fn simulate_latency(config: &PlaygroundConfig) {
    if config.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.delay_ms)).await;
    }
}

/// Query the product catalog variant used by the A/B comparison.
pub async fn search_variant(
    config: &PlaygroundConfig,
    variant: &str,
    params: &SearchParams,
) -> Vec<ResultRow> {
    simulate_latency(config).await;
    mock_search(params, variant)
}

/// Query each service with the same parameters. One simulated round trip
/// covers the whole comparison.
pub async fn compare(
    config: &PlaygroundConfig,
    services: &[String],
    params: &SearchParams,
) -> Vec<ServiceResults> {
    simulate_latency(config).await;
    services
        .iter()
        .map(|service| ServiceResults {
            service: service.clone(),
            title: service_title(service).to_string(),
            results: playground_search(service, params),
        })
        .collect()
}

/// Check a comparison selection: known services, no repeats, at most
/// [`MAX_COMPARED_SERVICES`].
pub fn validate_services(services: &[String]) -> Result<()> {
    if services.len() > MAX_COMPARED_SERVICES {
        bail!(
            "At most {} services can be compared, got {}",
            MAX_COMPARED_SERVICES,
            services.len()
        );
    }
    for (i, service) in services.iter().enumerate() {
        if !AVAILABLE_SERVICES.contains(&service.as_str()) {
            bail!(
                "Unknown service: '{}'. Available: {}",
                service,
                AVAILABLE_SERVICES.join(", ")
            );
        }
        if services[..i].contains(service) {
            bail!("Service '{}' is already in the comparison", service);
        }
    }
    Ok(())
}

/// Options for the `search` command.
pub struct SearchArgs {
    pub query: String,
    pub services: Vec<String>,
    pub variant: Option<String>,
    pub limit: Option<usize>,
    pub columns: Vec<String>,
    pub filters: Vec<String>,
    pub logical: String,
    pub explain: bool,
    pub json: bool,
}

pub async fn run_search(config: &Config, args: SearchArgs) -> Result<()> {
    let limit = args.limit.unwrap_or(config.playground.default_limit);

    let filters = args
        .filters
        .iter()
        .map(|f| Filter::parse(f))
        .collect::<Result<Vec<_>>>()?;
    let logical_op: LogicalOp = args.logical.parse()?;

    let mut params = SearchParams::new(args.query.clone(), limit);
    params.filters = filters;
    params.logical_op = logical_op;

    let filter_json = build_filter(&params.filters, params.logical_op);

    let columns: Vec<String> = if args.columns.is_empty() {
        DEFAULT_DISPLAY_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        args.columns.iter().map(|c| c.to_uppercase()).collect()
    };

    if let Some(variant) = args.variant.as_deref() {
        let rows = search_variant(&config.playground, variant, &params).await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            println!("Variant {}", variant);
            print_rows(&rows, &columns, false);
        }
        return Ok(());
    }

    let services = if args.services.is_empty() {
        vec![config.playground.default_service.clone()]
    } else {
        args.services.clone()
    };
    validate_services(&services)?;

    let sets = compare(&config.playground, &services, &params).await;

    if args.json {
        let out = serde_json::json!({
            "filter": filter_json,
            "services": sets,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if let Some(filter) = &filter_json {
        println!("filter: {}", serde_json::to_string(filter)?);
        println!();
    }

    for set in &sets {
        println!("== {} ({}) ==", set.title, set.service);
        if set.results.is_empty() {
            println!("No results for {}.", set.title);
            println!();
            continue;
        }
        print_rows(&set.results, &columns, args.explain);
    }

    Ok(())
}

fn print_rows(rows: &[ResultRow], columns: &[String], explain: bool) {
    if rows.is_empty() {
        println!("No results.");
        return;
    }
    for row in rows {
        match row.score {
            Some(score) => println!("{}. [{:.2}] {}", row.rank, score, row.source_label()),
            None => println!("{}. {}", row.rank, row.doc_id),
        }
        for column in columns {
            if let Some(value) = row.column(column) {
                println!("    {}: {}", column, value.replace('\n', " "));
            }
        }
        if explain {
            for (name, value, share) in row.explain() {
                println!("    score {:<18} {:.2} ({:.0}%)", name, value, share * 100.0);
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> PlaygroundConfig {
        PlaygroundConfig {
            delay_ms: 0,
            ..PlaygroundConfig::default()
        }
    }

    #[tokio::test]
    async fn test_compare_two_services() {
        let services = vec![
            "CHAT_CUSTOMER_TEST_CSS_A".to_string(),
            "CHAT_CUSTOMER_TEST_CSS_B".to_string(),
        ];
        let sets = compare(&instant(), &services, &SearchParams::new("", 10)).await;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].title, "Customer Support Search");
        assert_eq!(sets[1].results[0].doc_id, "doc-xyz-789");
    }

    #[tokio::test]
    async fn test_variant_search() {
        let rows = search_variant(&instant(), "B", &SearchParams::new("", 2)).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].doc_id, "doc_298_9a7a4f22");
    }

    #[tokio::test]
    async fn test_latency_is_simulated() {
        let config = PlaygroundConfig {
            delay_ms: 50,
            ..PlaygroundConfig::default()
        };
        let start = std::time::Instant::now();
        search_variant(&config, "A", &SearchParams::new("", 1)).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_services() {
        let a = "CHAT_CUSTOMER_TEST_CSS_A";
        let b = "CHAT_CUSTOMER_TEST_CSS_B";
        assert!(validate_services(&names(&[a, b])).is_ok());

        let err = validate_services(&names(&[a, b, a])).unwrap_err();
        assert!(err.to_string().contains("already in the comparison"));

        let err = validate_services(&names(&[a, a, a, a])).unwrap_err();
        assert!(err.to_string().contains("At most 3"));

        assert!(validate_services(&names(&["NOPE"])).is_err());
    }

    #[tokio::test]
    async fn test_run_search_rejects_repeated_service() {
        let mut config = Config::minimal();
        config.playground.delay_ms = 0;
        let args = SearchArgs {
            query: String::new(),
            services: names(&["CHAT_CUSTOMER_TEST_CSS_A", "CHAT_CUSTOMER_TEST_CSS_A"]),
            variant: None,
            limit: None,
            columns: Vec::new(),
            filters: Vec::new(),
            logical: "@and".to_string(),
            explain: false,
            json: false,
        };
        assert!(run_search(&config, args).await.is_err());
    }

    #[tokio::test]
    async fn test_limit_zero_yields_no_rows() {
        let services = names(&["CHAT_CUSTOMER_TEST_CSS_A"]);
        let sets = compare(&instant(), &services, &SearchParams::new("", 0)).await;
        assert!(sets[0].results.is_empty());

        let mut config = Config::minimal();
        config.playground.delay_ms = 0;
        let args = SearchArgs {
            query: String::new(),
            services,
            variant: None,
            limit: Some(0),
            columns: Vec::new(),
            filters: Vec::new(),
            logical: "@and".to_string(),
            explain: false,
            json: false,
        };
        assert!(run_search(&config, args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_search_rejects_unknown_service() {
        let mut config = Config::minimal();
        config.playground.delay_ms = 0;
        let args = SearchArgs {
            query: String::new(),
            services: vec!["NOPE".to_string()],
            variant: None,
            limit: None,
            columns: Vec::new(),
            filters: Vec::new(),
            logical: "@and".to_string(),
            explain: false,
            json: false,
        };
        assert!(run_search(&config, args).await.is_err());
    }

    #[tokio::test]
    async fn test_run_search_rejects_bad_filter() {
        let mut config = Config::minimal();
        config.playground.delay_ms = 0;
        let args = SearchArgs {
            query: String::new(),
            services: Vec::new(),
            variant: None,
            limit: None,
            columns: Vec::new(),
            filters: vec!["CATEGORY".to_string()],
            logical: "@and".to_string(),
            explain: false,
            json: false,
        };
        assert!(run_search(&config, args).await.is_err());
    }
}
