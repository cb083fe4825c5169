//! Full pipeline over the built-in layout backend
#![cfg(feature = "builtin")]

use std::fs;
use std::path::PathBuf;

use skelegen::async_api::Analyzer;
use skelegen::rendering::BuiltinRenderer;
use skelegen::{analyze_html, analyze_with, generate_skeleton_code, AnalyzerConfig, Backend};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config() -> AnalyzerConfig {
    AnalyzerConfig { settle_delay_ms: 0, ..Default::default() }
}

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

#[test]
fn golden_profile_card() {
    init_logging();
    let page = fs::read_to_string("tests/goldens/pages/profile_card.html").expect("read fixture");
    let result = analyze_with(&BuiltinRenderer::new(), &page, &config());
    assert!(result.error.is_none(), "{:?}", result.error);
    let code = generate_skeleton_code(&result.elements, &config());

    let expected_path = golden_path("profile_card.jsx");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::write(&expected_path, format!("{}\n", code)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let expected = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(code.trim_end(), expected.trim_end());
}

#[test]
fn profile_card_leaves() {
    init_logging();
    let page = fs::read_to_string("tests/goldens/pages/profile_card.html").expect("read fixture");
    let result = analyze_html(&page, &config());
    let kinds: Vec<&str> = result.elements.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["circle", "h2", "p", "button"]);

    let img = &result.elements[0];
    assert_eq!((img.x, img.y, img.width, img.height), (16.0, 16.0, 64.0, 64.0));
    assert_eq!(img.class_name, "w-16 h-16 rounded-full");
}

#[test]
fn empty_markup_variants_emit_placeholder() {
    init_logging();
    for markup in ["<div></div>", "<div><span></span></div>", "<script>document.write('x')</script>", "   "] {
        let result = analyze_html(markup, &config());
        assert!(result.error.is_none(), "{}: {:?}", markup, result.error);
        assert!(result.elements.is_empty(), "{}: {:?}", markup, result.elements);
        assert_eq!(generate_skeleton_code(&result.elements, &config()), skelegen::emit::EMPTY_SKELETON);
    }
}

#[test]
fn nested_text_is_classified_at_the_inner_element() {
    init_logging();
    let result = analyze_html("<div><span>Nested</span></div>", &config());
    let kinds: Vec<&str> = result.elements.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["span"]);
}

#[test]
fn deeply_nested_markup_is_an_error_not_a_crash() {
    init_logging();
    let cfg = AnalyzerConfig { max_depth: 32, ..config() };
    let markup = "<div>".repeat(100) + "deep";
    let result = analyze_html(&markup, &cfg);
    assert!(result.elements.is_empty());
    assert!(result.is_error());
}

#[test]
fn nesting_up_to_the_depth_limit_fits_a_default_thread_stack() {
    init_logging();
    let depth = AnalyzerConfig::default().max_depth;
    // std::thread::spawn uses the platform default stack size.
    let handle = std::thread::spawn(move || {
        let at_limit = analyze_html(&("<div>".repeat(depth) + "deep"), &config());
        let past_limit = analyze_html(&("<div>".repeat(depth + 1) + "deep"), &config());
        (at_limit, past_limit)
    });
    let (at_limit, past_limit) = handle.join().expect("analysis thread crashed");

    assert!(at_limit.error.is_none(), "{:?}", at_limit.error);
    assert_eq!(at_limit.elements.len(), 1);
    assert_eq!(at_limit.elements[0].kind, "div");
    assert!(past_limit.elements.is_empty());
    assert!(past_limit.is_error());
}

#[tokio::test]
async fn async_analyzer_handles_deep_markup() {
    init_logging();
    let analyzer = Analyzer::new(config(), Backend::Builtin).await.expect("analyzer");
    let depth = config().max_depth;
    let result = analyzer.analyze(&("<div>".repeat(depth) + "deep")).await;
    assert!(result.error.is_none(), "{:?}", result.error);
    assert_eq!(result.elements.len(), 1);
    analyzer.close().await.unwrap();
}

#[tokio::test]
async fn async_analyzer_over_builtin_backend() {
    init_logging();
    let analyzer = Analyzer::new(config(), Backend::Builtin).await.expect("analyzer");
    let result = analyzer.analyze(r#"<button class="w-48 h-9">Save</button>"#).await;
    assert!(result.error.is_none());
    assert_eq!(result.elements.len(), 1);
    assert_eq!(result.elements[0].kind, "button");
    analyzer.close().await.unwrap();
}
