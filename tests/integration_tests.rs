//! End-to-end tests over temporary project trees: scan, extract,
//! reconcile, and write placeholders back through the library surface.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use vintl::cli::file_scanner::scan_files;
use vintl::config::Config;
use vintl::core::locale::read::read_locales;
use vintl::core::locale::write::write_missing;
use vintl::core::{
    Diagnostics, Extraction, Extractor, Grammar, PoCatalog, UNTRANSLATED_PLACEHOLDER, reconcile,
};

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn run_extraction(config: &Config, source_root: &Path) -> Extraction {
    let rules = config.rule_set().unwrap();
    let scan = scan_files(
        source_root.to_str().unwrap(),
        &config.includes,
        &config.ignores,
        &config.extensions,
        false,
    );
    let mut extractor = Extractor::new(&rules, &config.extensions);
    for file in &scan.files {
        let source = fs::read_to_string(file).unwrap();
        extractor.extract_file(file, &source).unwrap();
    }
    extractor.finish()
}

#[test]
fn test_full_check_flow() {
    let project = tempdir().unwrap();
    let src = project.path().join("src");
    let locales_dir = project.path().join("locales");
    fs::create_dir_all(&locales_dir).unwrap();

    write_files(
        &src,
        &[
            (
                "App.vue",
                concat!(
                    "<template>\n",
                    "  <div>\n",
                    "    {{ $t('app.title') }}\n",
                    "    <span v-bind:title=\"flag ? 'hint.on' : 'hint.off'\">x</span>\n",
                    "  </div>\n",
                    "</template>\n",
                    "<script>\n",
                    "export default {\n",
                    "  created() { this.$t('app.created') }\n",
                    "}\n",
                    "</script>\n"
                ),
            ),
            ("util.js", "export const label = $t('util.label');\n"),
        ],
    );
    fs::write(
        locales_dir.join("en.json"),
        r#"{
  "app": { "title": "My App" },
  "hint": { "on": "On" },
  "stale": { "key": "Old" }
}"#,
    )
    .unwrap();

    let config = Config::default();
    let extraction = run_extraction(&config, &src);
    assert!(extraction.diagnostics.is_empty());

    let mut diagnostics = Diagnostics::new();
    let locales = read_locales(
        &locales_dir,
        &["en".to_string()],
        config.language_format,
        &config.key_separator,
        &mut diagnostics,
    )
    .unwrap();

    let report = reconcile(&extraction.usages, &locales);

    // Missing keys follow first-seen extraction order: the attribute
    // surfaces of App.vue scan before its interpolation markers, then the
    // script block, then util.js.
    let missing: Vec<(&str, bool)> = report
        .missing
        .iter()
        .map(|m| (m.key.as_str(), m.is_new))
        .collect();
    assert_eq!(
        missing,
        vec![
            ("hint.off", true),
            ("app.created", true),
            ("util.label", true),
        ]
    );
    let unused: Vec<&str> = report.unused.iter().map(|u| u.key.as_str()).collect();
    assert_eq!(unused, vec!["stale.key"]);

    // Write the placeholders back and run the reconciliation again: the
    // same keys are now tracked instead of new.
    write_missing(
        &locales_dir,
        config.language_format,
        &config.key_separator,
        &report.missing,
        true,
    )
    .unwrap();

    let locales = read_locales(
        &locales_dir,
        &["en".to_string()],
        config.language_format,
        &config.key_separator,
        &mut diagnostics,
    )
    .unwrap();
    let report = reconcile(&extraction.usages, &locales);
    let missing: Vec<(&str, bool)> = report
        .missing
        .iter()
        .map(|m| (m.key.as_str(), m.is_new))
        .collect();
    assert_eq!(
        missing,
        vec![
            ("hint.off", false),
            ("app.created", false),
            ("util.label", false),
        ]
    );
}

#[test]
fn test_custom_extension_maps_to_component_grammar() {
    // A project can route its own extensions to any grammar adapter.
    let project = tempdir().unwrap();
    let src = project.path().join("src");
    let locales_dir = project.path().join("locales");
    fs::create_dir_all(&locales_dir).unwrap();
    fs::write(locales_dir.join("en.json"), "{}").unwrap();

    write_files(
        &src,
        &[(
            "home.view",
            "<template>\n  <div>\n    {{ t('greeting.hello') }}\n  </div>\n</template>\n",
        )],
    );

    let mut config = Config::default();
    config.keywords = vec!["t".to_string()];
    config
        .extensions
        .insert("view".to_string(), Grammar::Component);

    let extraction = run_extraction(&config, &src);
    assert_eq!(extraction.usages.len(), 1);
    assert_eq!(extraction.usages[0].key, "greeting.hello");
    assert_eq!(extraction.usages[0].line, 3);
    assert!(extraction.usages[0].file_path.ends_with("home.view"));

    let mut diagnostics = Diagnostics::new();
    let locales = read_locales(
        &locales_dir,
        &["en".to_string()],
        config.language_format,
        &config.key_separator,
        &mut diagnostics,
    )
    .unwrap();
    let report = reconcile(&extraction.usages, &locales);

    assert_eq!(report.missing.len(), 1);
    let missing = &report.missing[0];
    assert_eq!(missing.key, "greeting.hello");
    assert_eq!(missing.line, 3);
    assert_eq!(missing.locale, "en");
    assert!(missing.is_new);
    assert!(report.unused.is_empty());
}

#[test]
fn test_unused_key_reported_per_locale() {
    let project = tempdir().unwrap();
    let src = project.path().join("src");
    let locales_dir = project.path().join("locales");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&locales_dir).unwrap();

    fs::write(locales_dir.join("fr.json"), r#"{"orphan": {"key": "Bonjour"}}"#).unwrap();

    let config = Config::default();
    let extraction = run_extraction(&config, &src);

    let mut diagnostics = Diagnostics::new();
    let locales = read_locales(
        &locales_dir,
        &["fr".to_string()],
        config.language_format,
        &config.key_separator,
        &mut diagnostics,
    )
    .unwrap();
    let report = reconcile(&extraction.usages, &locales);

    assert!(report.missing.is_empty());
    assert_eq!(report.unused.len(), 1);
    assert_eq!(report.unused[0].key, "orphan.key");
    assert_eq!(report.unused[0].value, "Bonjour");
    assert_eq!(report.unused[0].locale, "fr");
}

#[test]
fn test_sentinel_round_trip_through_yaml() {
    let project = tempdir().unwrap();
    let src = project.path().join("src");
    let locales_dir = project.path().join("locales");
    fs::create_dir_all(&locales_dir).unwrap();

    write_files(&src, &[("app.js", "$t('new.key');\n$t('tracked.key');\n")]);
    fs::write(
        locales_dir.join("de.yaml"),
        format!("tracked:\n  key: {}\n", UNTRANSLATED_PLACEHOLDER),
    )
    .unwrap();

    let mut config = Config::default();
    config.locales = vec!["de".to_string()];
    config.language_format = vintl::core::Format::Yaml;

    let extraction = run_extraction(&config, &src);
    let mut diagnostics = Diagnostics::new();
    let locales = read_locales(
        &locales_dir,
        &config.locales,
        config.language_format,
        &config.key_separator,
        &mut diagnostics,
    )
    .unwrap();
    let report = reconcile(&extraction.usages, &locales);

    let missing: Vec<(&str, bool)> = report
        .missing
        .iter()
        .map(|m| (m.key.as_str(), m.is_new))
        .collect();
    assert_eq!(missing, vec![("new.key", true), ("tracked.key", false)]);

    // Only the new key is written; afterwards both are tracked.
    write_missing(
        &locales_dir,
        config.language_format,
        &config.key_separator,
        &report.missing,
        true,
    )
    .unwrap();
    let content = fs::read_to_string(locales_dir.join("de.yaml")).unwrap();
    assert!(content.contains("new:"));
    assert!(content.contains("tracked:"));
    assert_eq!(content.matches(UNTRANSLATED_PLACEHOLDER).count(), 2);
}

#[test]
fn test_po_catalog_round_trip_from_extraction() {
    let project = tempdir().unwrap();
    let src = project.path().join("src");

    write_files(
        &src,
        &[
            ("a.js", "$t('shared.key');\n"),
            ("b.js", "$t('shared.key');\n$t('only.b');\n"),
        ],
    );

    let config = Config::default();
    let extraction = run_extraction(&config, &src);

    let serialized = extraction.catalog.serialize();
    let parsed = PoCatalog::deserialize(&serialized).unwrap();
    assert_eq!(parsed, extraction.catalog);

    // The shared key carries both references, sorted.
    let entry = parsed.find(None, "shared.key").unwrap().unwrap();
    let refs: Vec<&String> = entry.references.iter().collect();
    assert_eq!(refs.len(), 2);
    assert!(refs[0].ends_with("a.js:1"));
    assert!(refs[1].ends_with("b.js:1"));
}

#[test]
fn test_parse_failures_do_not_abort_the_scan() {
    let project = tempdir().unwrap();
    let src = project.path().join("src");

    write_files(
        &src,
        &[
            ("broken.js", "const = nope;\n"),
            ("fine.js", "$t('fine.key');\n"),
        ],
    );

    let config = Config::default();
    let extraction = run_extraction(&config, &src);

    assert_eq!(extraction.usages.len(), 1);
    assert_eq!(extraction.usages[0].key, "fine.key");
    assert_eq!(extraction.diagnostics.len(), 1);
    assert!(extraction.diagnostics.warnings()[0]
        .file_path
        .ends_with("broken.js"));
}
