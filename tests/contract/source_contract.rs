//! Contract tests: every built-in adapter honours the error taxonomy and
//! shape guarantees of `SourceAdapter` when driven by canned HTTP responses.

use std::sync::Arc;

use pricescout_core::{
    CoingeckoSource, CurrencyPreference, HttpError, HttpResponse, ScriptedHttpClient,
    SourceAdapter, SourceErrorKind, SourceId, SymbolQuery, YahooSource,
};

const YAHOO_CHART: &str = r#"{"chart":{"result":[{
    "meta":{"currency":"EUR"},
    "timestamp":[1515628800,1515715200],
    "indicators":{"quote":[{"close":[2.0,3.0]}]}
}],"error":null}}"#;

const YAHOO_SEARCH: &str = r#"{"quotes":[
    {"symbol":"BMW.DE","shortname":"BMW AG","longname":"Bayerische Motoren Werke AG","quoteType":"EQUITY","exchange":"GER"},
    {"symbol":"BMWYY","shortname":"BMW ADR","quoteType":"EQUITY","exchange":"PNK"}
]}"#;

const COINGECKO_CHART: &str = r#"{"prices":[[1515628800000,2.0],[1515715200000,3.0]]}"#;

const COINGECKO_LIST: &str = r#"[
    {"id":"bitcoin","symbol":"btc","name":"Bitcoin"},
    {"id":"bitcoin-cash","symbol":"bch","name":"Bitcoin Cash"},
    {"id":"ethereum","symbol":"eth","name":"Ethereum"}
]"#;

struct AdapterCase {
    id: SourceId,
    query: &'static str,
    history_fragment: &'static str,
    history_body: &'static str,
}

fn cases() -> Vec<AdapterCase> {
    vec![
        AdapterCase {
            id: SourceId::Yahoo,
            query: "BMW.DE",
            history_fragment: "/chart/",
            history_body: YAHOO_CHART,
        },
        AdapterCase {
            id: SourceId::Coingecko,
            query: "bitcoin",
            history_fragment: "/market_chart",
            history_body: COINGECKO_CHART,
        },
    ]
}

fn adapter(id: SourceId, client: ScriptedHttpClient) -> Arc<dyn SourceAdapter> {
    let client = Arc::new(client);
    match id {
        SourceId::Yahoo => Arc::new(YahooSource::with_http_client(client)),
        SourceId::Coingecko => Arc::new(CoingeckoSource::with_http_client(client)),
    }
}

async fn history_error_kind(case: &AdapterCase, response: Result<HttpResponse, HttpError>) -> SourceErrorKind {
    let source = adapter(
        case.id,
        ScriptedHttpClient::new().with_sequence(case.history_fragment, vec![response]),
    );
    source
        .price_history(&SymbolQuery::from(case.query), &CurrencyPreference::default())
        .await
        .map(|_| ())
        .expect_err("scripted failure")
        .kind()
}

#[tokio::test]
async fn histories_are_strictly_increasing_for_all_sources() {
    for case in cases() {
        let source = adapter(
            case.id,
            ScriptedHttpClient::new()
                .with_route(case.history_fragment, HttpResponse::ok_json(case.history_body)),
        );
        assert_eq!(source.id(), case.id);

        let history = source
            .price_history(&SymbolQuery::from(case.query), &CurrencyPreference::default())
            .await
            .unwrap_or_else(|error| panic!("source '{}' history failed: {error}", case.id));

        assert_eq!(history.len(), 2, "source '{}': entry count", case.id);
        assert!(
            history.series().windows(2).all(|pair| pair[0].ts < pair[1].ts),
            "source '{}': series order",
            case.id
        );
        assert_eq!(history.last().map(|entry| entry.close), Some(3.0));
    }
}

#[tokio::test]
async fn throttling_statuses_map_to_rate_limited_for_all_sources() {
    for case in cases() {
        let kind = history_error_kind(&case, Ok(HttpResponse::new(429, ""))).await;
        assert_eq!(kind, SourceErrorKind::RateLimited, "source '{}'", case.id);
    }
}

#[tokio::test]
async fn server_faults_and_timeouts_map_to_transient_for_all_sources() {
    for case in cases() {
        let unavailable = history_error_kind(&case, Ok(HttpResponse::new(503, ""))).await;
        let gateway = history_error_kind(&case, Ok(HttpResponse::new(504, ""))).await;
        let timeout = history_error_kind(&case, Err(HttpError::new("operation timed out"))).await;

        assert_eq!(unavailable, SourceErrorKind::Transient, "source '{}'", case.id);
        assert_eq!(gateway, SourceErrorKind::Transient, "source '{}'", case.id);
        assert_eq!(timeout, SourceErrorKind::Transient, "source '{}'", case.id);
    }
}

#[tokio::test]
async fn missing_symbols_map_to_symbol_not_found_for_all_sources() {
    for case in cases() {
        let kind = history_error_kind(&case, Ok(HttpResponse::new(404, "{}"))).await;
        assert_eq!(kind, SourceErrorKind::SymbolNotFound, "source '{}'", case.id);
    }
}

#[tokio::test]
async fn yahoo_quotes_in_the_ticker_currency() {
    let source = adapter(
        SourceId::Yahoo,
        ScriptedHttpClient::new().with_route("/chart/", HttpResponse::ok_json(YAHOO_CHART)),
    );
    let usd = CurrencyPreference::default();

    let history = source
        .price_history(&SymbolQuery::from("BMW.DE"), &usd)
        .await
        .expect("history");

    assert_eq!(history.currency(), "EUR");
}

#[tokio::test]
async fn coingecko_rejects_unsupported_currencies() {
    let source = adapter(
        SourceId::Coingecko,
        ScriptedHttpClient::new().with_route(
            "/market_chart",
            HttpResponse::new(400, r#"{"error":"invalid vs_currency"}"#),
        ),
    );
    let currency = "XYZ".parse::<CurrencyPreference>().expect("well-formed code");

    let error = source
        .price_history(&SymbolQuery::from("bitcoin"), &currency)
        .await
        .expect_err("unsupported");

    assert_eq!(error.kind(), SourceErrorKind::CurrencyNotSupported);
    assert_eq!(error.code(), "source.currency_not_supported");
}

#[tokio::test]
async fn yahoo_search_candidates_convert_into_symbols() {
    let source = adapter(
        SourceId::Yahoo,
        ScriptedHttpClient::new().with_route("/finance/search", HttpResponse::ok_json(YAHOO_SEARCH)),
    );

    let candidates = source.search_candidates("bmw").await.expect("search");
    let symbols = candidates
        .into_iter()
        .map(|candidate| candidate.into_symbol(SourceId::Yahoo))
        .collect::<Result<Vec<_>, _>>()
        .expect("convertible");

    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols[0].name(), "BMW.DE");
    assert_eq!(symbols[0].query_string(), "BMW.DE");
    assert!(symbols[0].matches("bayerische motoren werke ag"));
    assert_eq!(symbols[0].exchange(), Some("GER"));
}

#[tokio::test]
async fn coingecko_search_filters_the_coin_list_and_fetches_it_once() {
    let client = Arc::new(
        ScriptedHttpClient::new().with_route("/coins/list", HttpResponse::ok_json(COINGECKO_LIST)),
    );
    let source = CoingeckoSource::with_http_client(client.clone());

    let first = source.search_candidates("bitcoin").await.expect("search");
    let second = source.search_candidates("eth").await.expect("search");

    let queries: Vec<_> = first
        .into_iter()
        .map(|candidate| {
            candidate
                .into_symbol(SourceId::Coingecko)
                .expect("convertible")
                .query_string()
        })
        .collect();
    assert_eq!(queries, ["bitcoin", "bitcoin-cash"]);
    assert_eq!(second.len(), 1);
    assert_eq!(client.requests().len(), 1);
}
