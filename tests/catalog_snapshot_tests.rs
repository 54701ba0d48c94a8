//! Golden snapshot tests for catalog listings and script-derived expectations
//!
//! Run with: `cargo test --test catalog_snapshot_tests`
//! Review changes: `cargo insta review`

use std::fs;

use varmatrix::cli::commands::write_catalog;
use varmatrix::script::{ExpectationScript, Flags, Variables};
use varmatrix::{Environment, ToolTarget, VariantKind, build_catalog_for};

fn render_catalog(base_args: &[&str], env: &[(&str, &str)]) -> String {
    let base_args: Vec<String> = base_args.iter().map(|a| a.to_string()).collect();
    let env: Environment = env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let catalog = build_catalog_for(&ToolTarget::default(), &base_args, &env);

    let mut out = Vec::new();
    write_catalog(&mut out, &catalog).expect("writing to a Vec cannot fail");
    String::from_utf8(out).expect("catalog listing is UTF-8")
}

#[test]
fn test_catalog_listing_with_bucket_options() {
    let listing = render_catalog(&["--osBucketName=bucket", "--ocimds=true"], &[]);
    insta::assert_snapshot!("catalog_listing_with_bucket_options", listing);
}

#[test]
fn test_catalog_listing_with_env_and_spaces() {
    let listing = render_catalog(&["--osNamespace=my namespace"], &[("OCI_CONFIG_FILE", "/tmp/oci config")]);
    insta::assert_snapshot!("catalog_listing_with_env_and_spaces", listing);
}

#[test]
fn expectations_from_script() {
    let vars: Variables = [("__busy_port", "3307"), ("__mysql_port", "3306")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    insta::glob!("fixtures/scripts/*.js", |path| {
        let source = fs::read_to_string(path).expect("fixture is readable");
        let script = ExpectationScript::parse("fixture.js", &source, &vars).expect("fixture parses");
        let expectations = script
            .to_expectations("fallback", &Flags::new())
            .expect("fixture expectations are unambiguous");

        let mut rendered = format!("default: {:?}\n", expectations.default_expectation());
        for kind in VariantKind::ALL {
            rendered.push_str(&format!("{}: {:?}\n", kind, expectations.effective(kind)));
        }
        insta::assert_snapshot!(rendered);
    });
}
