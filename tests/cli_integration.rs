//! Integration tests: saved completions normalized and rendered for the terminal,
//! plus provider settings resolution.

use std::collections::HashMap;
use std::time::Duration;
use textlens::format::{format_financial, format_result, format_timeline, FormatOptions};
use textlens::settings::{resolve_settings_with, KindSelection, Overrides};
use textlens_core::{normalize, AnalysisKind, AnalysisResult, ConfigError, ProviderKind, TextlensConfig};

fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {name}: {e}"))
}

fn fixture_result(kind: AnalysisKind, name: &str) -> AnalysisResult {
    normalize(kind, &load_fixture(name)).unwrap()
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

// ===========================================================================
// Saved completions
// ===========================================================================

#[test]
fn timeline_fixture_keeps_model_order() {
    let result = fixture_result(AnalysisKind::Timeline, "timeline-completion.txt");
    let AnalysisResult::Timeline(events) = &result else {
        panic!("Expected timeline, got {:?}", result);
    };
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Founded", "Series A", "IPO"]);
}

#[test]
fn insights_fixture_sorted_undated_first() {
    let result = fixture_result(AnalysisKind::Insights, "insights-completion.txt");
    let AnalysisResult::Insights(categories) = &result else {
        panic!("Expected insights, got {:?}", result);
    };
    let names: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["Themes", "Origins", "Growth"]);
    assert!(categories[1].subcategories[0].opportunities.is_empty());
}

#[test]
fn financial_fixture_sorted_within_category() {
    let result = fixture_result(AnalysisKind::Financial, "financial-completion.txt");
    let AnalysisResult::Financial(categories) = &result else {
        panic!("Expected financial, got {:?}", result);
    };
    let names: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(names, vec!["Funding", "Balance sheet"]);
    let metrics: Vec<&str> = categories[0].items.iter().map(|i| i.metric.as_str()).collect();
    assert_eq!(metrics, vec!["Series A", "Series B"]);
    assert_eq!(categories[0].items[0].value, "5000000");
    assert!(categories[1].items[0].parties.is_none());
}

#[test]
fn parties_fixture_wrapped_and_sorted() {
    let result = fixture_result(AnalysisKind::Party, "parties-completion.txt");
    let json = result.to_json().unwrap();
    assert_eq!(json["parties"][0]["name"], "Jane Doe");
    assert_eq!(json["parties"][1]["type"], "organization");
}

// ===========================================================================
// Rendering
// ===========================================================================

#[test]
fn render_timeline_has_markers_and_descriptions() {
    let result = fixture_result(AnalysisKind::Timeline, "timeline-completion.txt");
    let AnalysisResult::Timeline(events) = &result else {
        panic!("Expected timeline");
    };
    let out = format_timeline(events);
    assert!(out.starts_with("● 1999-03-01  Founded\n"));
    assert!(out.contains("│   Raises $5M from Northwind Ventures.\n"));
    assert!(out.contains("│   Hires first ten engineers.\n"));
    assert!(out.contains("● 2008-11-20T14:30:00Z  IPO\n"));
    // Last event has no rail below it.
    assert!(out.ends_with("    Lists on NASDAQ.\n"));
}

#[test]
fn render_insights_as_tree() {
    let result = fixture_result(AnalysisKind::Insights, "insights-completion.txt");
    let out = format_result(&result, &FormatOptions::default());
    assert!(out.starts_with("═══ Insights ═══\n"));
    assert!(out.contains("Origins (1999-03-01)\n├─ Founding team\n"));
    assert!(out.contains("└─ Early product\n"));
    assert!(out.contains("     - No funding\n"));
    assert!(out.contains("Themes\n\n"));
}

#[test]
fn render_financial_table_columns_align() {
    let result = fixture_result(AnalysisKind::Financial, "financial-completion.txt");
    let AnalysisResult::Financial(categories) = &result else {
        panic!("Expected financial");
    };
    let out = format_financial(categories, &FormatOptions::default());
    assert!(out.starts_with("─── Funding ───\n"));

    let table: Vec<&str> = out.lines().skip(1).take(4).collect();
    assert!(table[0].starts_with("Item "));
    let divider = table[0].find('│').unwrap();
    assert_eq!(table[2].find('│').unwrap(), divider);
    assert_eq!(table[3].find('│').unwrap(), divider);
    assert!(table[2].contains("transaction"));
    assert!(table[3].contains("Acme, Northwind Ventures"));
    assert!(out.contains("─── Balance sheet ───\n"));
}

#[test]
fn render_financial_clips_long_cells() {
    let raw = r#"[{"category":"C","items":[{"metric":"m","value":"v","period":"p","type":"metric",
        "notes":"a very long note that keeps going well past the table's width limit"}]}]"#;
    let AnalysisResult::Financial(categories) = normalize(AnalysisKind::Financial, raw).unwrap() else {
        panic!("Expected financial");
    };

    let clipped = format_financial(&categories, &FormatOptions::default());
    assert!(clipped.contains("a very long note that keeps going wel..."));
    assert!(!clipped.contains("width limit"));

    let opts = FormatOptions {
        raw: true,
        ..Default::default()
    };
    assert!(format_financial(&categories, &opts).contains("width limit"));
}

#[test]
fn render_party_cards() {
    let result = fixture_result(AnalysisKind::Party, "parties-completion.txt");
    let opts = FormatOptions {
        source: Some("mistral/mistral-large-latest".into()),
        ..Default::default()
    };
    let out = format_result(&result, &opts);
    assert!(out.starts_with("═══ Parties (mistral/mistral-large-latest) ═══\n"));
    assert!(out.contains("┌ Jane Doe (person)\n│ 1999-03-01\n"));
    assert!(out.contains("│ Mishaps & Setbacks:\n│   (none)\n"));
    assert!(out.contains("│   - Board seat\n"));
}

#[test]
fn render_empty_result() {
    let out = format_result(&AnalysisResult::empty(AnalysisKind::Financial), &FormatOptions::default());
    assert_eq!(out, "═══ Financial ═══\n(nothing found)\n");
}

// ===========================================================================
// Settings resolution
// ===========================================================================

#[test]
fn kind_selection_parses() {
    assert_eq!("all".parse::<KindSelection>().unwrap(), KindSelection::All);
    assert_eq!(
        "party".parse::<KindSelection>().unwrap(),
        KindSelection::One(AnalysisKind::Party)
    );
    assert!("everything".parse::<KindSelection>().is_err());
    assert_eq!(KindSelection::All.kinds(), AnalysisKind::ALL.to_vec());
    assert_eq!(KindSelection::One(AnalysisKind::Timeline).to_string(), "timeline");
}

#[test]
fn settings_from_file_only() {
    let config = TextlensConfig::parse(
        r#"{"provider":"mistral","mistral":{"apiKey":"file-key","model":"mistral-small-latest",
            "baseUrl":"http://localhost:9000/v1"},"requestTimeoutSecs":30}"#,
    )
    .unwrap();
    let settings = resolve_settings_with(&config, &Overrides::default(), env_from(&[])).unwrap();
    assert_eq!(settings.kind, ProviderKind::Mistral);
    assert_eq!(settings.api_key, "file-key");
    assert_eq!(settings.model.as_deref(), Some("mistral-small-latest"));
    assert_eq!(settings.base_url.as_deref(), Some("http://localhost:9000/v1"));
    assert_eq!(settings.timeout, Some(Duration::from_secs(30)));
}

#[test]
fn settings_env_beats_file_and_flags_beat_env() {
    let config = TextlensConfig::parse(
        r#"{"provider":"mistral","openai":{"apiKey":"file-openai","model":"gpt-4o-mini"}}"#,
    )
    .unwrap();
    let env = env_from(&[("TEXTLENS_PROVIDER", "openai"), ("OPENAI_API_KEY", "env-openai")]);

    let from_env = resolve_settings_with(&config, &Overrides::default(), &env).unwrap();
    assert_eq!(from_env.kind, ProviderKind::OpenAi);
    assert_eq!(from_env.api_key, "env-openai");
    assert_eq!(from_env.model.as_deref(), Some("gpt-4o-mini"));
    assert!(from_env.timeout.is_none());

    let overrides = Overrides {
        provider: Some(ProviderKind::OpenAi),
        model: Some("gpt-4.1".into()),
    };
    let from_flags = resolve_settings_with(&config, &overrides, &env).unwrap();
    assert_eq!(from_flags.model.as_deref(), Some("gpt-4.1"));
}

#[test]
fn settings_missing_key_names_env_var() {
    let overrides = Overrides {
        provider: Some(ProviderKind::Mistral),
        model: None,
    };
    let err = resolve_settings_with(&TextlensConfig::default(), &overrides, env_from(&[]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingApiKey { .. }));
    assert!(err.to_string().contains("MISTRAL_API_KEY"));
}

#[test]
fn settings_zero_timeout_means_none() {
    let config = TextlensConfig::parse(r#"{"requestTimeoutSecs":0}"#).unwrap();
    let settings =
        resolve_settings_with(&config, &Overrides::default(), env_from(&[("OPENAI_API_KEY", "k")]))
            .unwrap();
    assert_eq!(settings.kind, ProviderKind::OpenAi);
    assert!(settings.timeout.is_none());
}
