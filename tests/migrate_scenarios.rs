//! Scan-then-migrate runs over realistic site trees

use composerify::fs::MockFileSystem;
use composerify::manifest::{render, Manifest, ManifestMigrator, Migration, SEEDED_CORE_PACKAGES};
use composerify::scanner::{ProjectKind, ProjectScanner, ScanResult};
use std::path::Path;

const SITE: &str = "/mock/site";

const BOLTED_COMPOSER: &str = r#"{
    "require": {
        "drupal/core-recommended": "^8.9",
        "drupal/core": "8.9.20",
        "drupal/views_bulk_operations": "^3.4",
        "acme/custom-lib": "^1.0",
        "drush/drush": "^8",
        "composer/installers": "^1.2",
        "Drupal/Core-Dev": "^8.9"
    },
    "require-dev": {
        "phpunit/phpunit": "^7"
    },
    "extra": {
        "patches": {}
    }
}"#;

fn scan(files: &[(&str, &str)]) -> ScanResult {
    let fs = MockFileSystem::new();
    fs.add_dir(SITE);
    for (path, content) in files {
        fs.add_file(Path::new(SITE).join(path), content);
    }
    ProjectScanner::new(&fs).scan(Path::new(SITE))
}

fn site_files() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "modules/contrib/views_bulk_operations/views_bulk_operations.info.yml",
            "name: VBO\nversion: '8.x-3.4'\nproject: views_bulk_operations\n",
        ),
        (
            "modules/contrib/token/token.info.yml",
            "name: Token\nversion: '8.x-1.x-dev'\n",
        ),
        (
            "themes/contrib/bootstrap/bootstrap.info.yml",
            "name: Bootstrap\nversion: '8.x-3.23'\n",
        ),
        (
            "modules/custom/site_tweaks/site_tweaks.info.yml",
            "name: Site tweaks\nversion: '1.0.0'\n",
        ),
        ("libraries/custom-lib/lib.js", "/* lib */\n"),
        ("libraries/colorbox/jquery.colorbox.js", "/* colorbox */\n"),
    ]
}

fn migrate(source: &str, scan: &ScanResult, vendor: &str) -> Migration {
    let manifest = Manifest::parse(source, Path::new("composer.json")).unwrap();
    ManifestMigrator::new(vendor).migrate(
        &manifest,
        &scan.contrib,
        &scan.library_names(),
        Path::new("libraries-backup"),
    )
}

fn rendered(migration: &Migration) -> String {
    render(&migration.manifest.merge_into(None)).unwrap()
}

#[test]
fn test_migration_is_byte_identical_across_runs() {
    let first_scan = scan(&site_files());
    let second_scan = scan(&site_files());
    assert_eq!(first_scan, second_scan);

    let first = migrate(BOLTED_COMPOSER, &first_scan, "drupal");
    let second = migrate(BOLTED_COMPOSER, &second_scan, "drupal");

    assert_eq!(first, second);
    assert_eq!(rendered(&first), rendered(&second));
}

#[test]
fn test_no_core_package_outside_seeded_entries() {
    let migration = migrate(BOLTED_COMPOSER, &scan(&site_files()), "drupal");
    let require: Vec<(&str, &str)> = migration.manifest.require.iter().collect();

    assert_eq!(&require[..SEEDED_CORE_PACKAGES.len()], SEEDED_CORE_PACKAGES);
    for (package, _) in &require[SEEDED_CORE_PACKAGES.len()..] {
        let lower = package.to_ascii_lowercase();
        assert!(
            lower != "drupal/core" && !lower.starts_with("drupal/core-"),
            "core package {} leaked into the migrated manifest",
            package
        );
        assert!(!SEEDED_CORE_PACKAGES.iter().any(|(name, _)| *name == lower));
    }
    assert_eq!(migration.manifest.require.get("drush/drush"), Some("^10"));
    assert_eq!(migration.manifest.require.get("composer/installers"), Some("^1.9"));
}

#[test]
fn test_bolted_site_scenario() {
    let source = r#"{"require": {"drupal/core-recommended": "^8.9", "drupal/views_bulk_operations": "^3.4", "acme/custom-lib": "^1.0"}}"#;
    let scan = scan(&site_files()[..1]);
    assert_eq!(scan.contrib.len(), 1);
    assert!(scan.libraries.is_empty());

    let migration = migrate(source, &scan, "vendor");
    let require = &migration.manifest.require;

    for (package, constraint) in SEEDED_CORE_PACKAGES {
        assert_eq!(require.get(package), Some(*constraint));
    }
    assert_eq!(require.get("vendor/views_bulk_operations"), Some("^3.4"));
    assert_eq!(require.get("acme/custom-lib"), Some("^1.0"));
    assert_eq!(require.get("drupal/core-recommended"), Some("^9.2"));
    assert_eq!(require.len(), SEEDED_CORE_PACKAGES.len() + 2);
    assert!(migration.warnings.is_empty());
}

#[test]
fn test_full_site_migration() {
    let scan = scan(&site_files());
    let migration = migrate(BOLTED_COMPOSER, &scan, "drupal");
    let require = &migration.manifest.require;

    assert_eq!(require.get("drupal/views_bulk_operations"), Some("^3.4"));
    assert_eq!(require.get("drupal/bootstrap"), Some("^3.23"));
    assert_eq!(require.get("drupal/token"), Some("*"));
    assert!(!require.contains("drupal/site_tweaks"));
    assert_eq!(require.get("acme/custom-lib"), Some("^1.0"));

    assert_eq!(migration.mapped_libraries.len(), 1);
    assert_eq!(migration.mapped_libraries[0].library, "custom-lib");
    assert_eq!(migration.relocations.len(), 1);
    assert_eq!(
        migration.relocations[0].destination,
        Path::new("libraries-backup/colorbox")
    );
    assert_eq!(migration.warnings.len(), 2);

    assert_eq!(
        migration.manifest.require_dev.get("phpunit/phpunit"),
        Some("^7")
    );
    assert!(migration.manifest.extra.contains_key("patches"));
}

#[test]
fn test_custom_location_wins_over_version_marker() {
    let scan = scan(&site_files());
    let custom: Vec<_> = scan.custom.iter().map(|p| (p.name(), p.kind())).collect();
    assert_eq!(custom, vec![("site_tweaks", ProjectKind::CustomModule)]);
    assert!(scan.contrib.iter().all(|p| p.kind().is_contrib()));
}
