use seoscope::handlers::*;
use tempfile::TempDir;

#[test]
fn test_normalize_target_url_with_scheme() {
    assert_eq!(
        normalize_target_url("https://example.com"),
        "https://example.com"
    );
    assert_eq!(
        normalize_target_url("  http://example.com/blog "),
        "http://example.com/blog"
    );
}

#[test]
fn test_normalize_target_url_bare_host() {
    assert_eq!(normalize_target_url("example.com"), "https://example.com");
    assert_eq!(
        normalize_target_url("www.example.com/about"),
        "https://www.example.com/about"
    );
    assert_eq!(normalize_target_url("localhost"), "https://localhost");
}

#[test]
fn test_normalize_target_url_passes_garbage_through() {
    assert_eq!(normalize_target_url("not a url"), "not a url");
    assert_eq!(normalize_target_url("justaword"), "justaword");
}

#[test]
fn test_verbosity_filter() {
    assert_eq!(verbosity_filter(0), "warn");
    assert_eq!(verbosity_filter(1), "info");
    assert_eq!(verbosity_filter(2), "debug");
    assert_eq!(verbosity_filter(7), "debug");
}

#[test]
fn test_extract_url_path() {
    assert_eq!(extract_url_path("https://example.com/blog/post"), "/blog/post");
    assert_eq!(extract_url_path("https://example.com/"), "/");
    assert_eq!(extract_url_path("https://example.com"), "/");
    assert_eq!(extract_url_path("not a url"), "not a url");
}

#[test]
fn test_resolve_output_path_expands_tilde() {
    let resolved = resolve_output_path("~/reports/audit.json");
    assert!(!resolved.to_string_lossy().starts_with('~'));
    assert!(resolved.ends_with("reports/audit.json"));

    let plain = resolve_output_path("/tmp/audit.json");
    assert_eq!(plain.to_str(), Some("/tmp/audit.json"));
}

#[test]
fn test_write_report_creates_parents() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let target = dir.path().join("nested/deeper/report.md");

    let written = write_report("# SEO Audit\n", target.to_str().unwrap())?;

    assert_eq!(written, target);
    assert_eq!(std::fs::read_to_string(&target)?, "# SEO Audit\n");
    Ok(())
}
