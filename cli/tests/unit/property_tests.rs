//! Property-based tests for configuration validation and the generated
//! environment and unit files.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use proptest::prelude::*;

use kiln_cli::domain::config::{IdValue, ProvisionSettings, validate_unit_name};
use kiln_cli::domain::env_file::{ENV_KEYS, EnvironmentFile, TuningConstants, parse};
use kiln_cli::domain::health::{HealthStatus, ProbeTarget};
use kiln_cli::domain::unit::ServiceUnit;

fn settings(api_hash: String, bearer: Option<String>, port: u16) -> ProvisionSettings {
    ProvisionSettings {
        repo: Some("https://example.com/mirror.git".to_string()),
        api_id: Some(IdValue::Number(4242)),
        api_hash: Some(api_hash),
        bearer,
        port: Some(port),
        user: Some("svc".to_string()),
        dir: Some(PathBuf::from("/srv/mirror")),
        ..ProvisionSettings::default()
    }
}

// ============================================================================
// Environment file
// ============================================================================

proptest! {
    /// Every key appears exactly once, in the fixed order, and parses back.
    #[test]
    fn prop_env_file_has_every_key_once(
        hash in "[A-Za-z0-9]{1,40}",
        bearer in proptest::option::of("[A-Za-z0-9._~-]{1,40}"),
        port in 1u16..,
    ) {
        let cfg = settings(hash.clone(), bearer.clone(), port).into_config(false, None);
        prop_assert!(cfg.validate().is_ok());

        let rendered = EnvironmentFile::new(&cfg, &TuningConstants::default()).render();
        let parsed = parse(&rendered);
        let keys: Vec<&str> = parsed.iter().map(|(k, _)| k.as_str()).collect();
        prop_assert_eq!(keys, ENV_KEYS.to_vec());

        let value = |key: &str| {
            parsed
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        prop_assert_eq!(value("API_HASH"), hash);
        prop_assert_eq!(value("API_BEARER"), bearer.unwrap_or_default());
        prop_assert_eq!(value("BIND_PORT"), port.to_string());
    }

    /// Masked output never leaks a credential.
    #[test]
    fn prop_masked_env_hides_secrets(
        hash in "[a-f0-9]{16,32}",
        bearer in "[A-Za-z0-9]{12,32}",
    ) {
        let cfg = settings(hash.clone(), Some(bearer.clone()), 8080).into_config(false, None);
        let masked = EnvironmentFile::new(&cfg, &TuningConstants::default()).render_masked();
        prop_assert!(!masked.contains(&hash));
        prop_assert!(!masked.contains(&bearer));
    }
}

// ============================================================================
// Validation
// ============================================================================

proptest! {
    /// Line breaks in values written verbatim are always rejected.
    #[test]
    fn prop_line_breaks_rejected(
        prefix in "[a-z0-9]{0,10}",
        suffix in "[a-z0-9]{0,10}",
        brk in prop_oneof![Just("\n"), Just("\r"), Just("\r\n")],
    ) {
        let hash = format!("{prefix}{brk}{suffix}");
        let cfg = settings(hash, None, 8080).into_config(false, None);
        let err = cfg.validate().expect_err("line break accepted");
        prop_assert_eq!(err.code(), "CONFIG_ERROR");
    }

    /// A control character in any path or value written into the unit is
    /// rejected, so no extra directive can be smuggled in.
    #[test]
    fn prop_unit_values_reject_control_chars(
        head in "[a-z]{1,8}",
        ctl in prop::char::range('\u{0}', '\u{1f}'),
        tail in "[A-Za-z=/ ]{0,20}",
        field in 0usize..4,
    ) {
        let value = format!("{head}{ctl}{tail}");
        let mut s = settings("hash".to_string(), None, 8080);
        match field {
            0 => s.entrypoint = Some(value),
            1 => s.dir = Some(PathBuf::from(format!("/srv/{value}"))),
            2 => s.branch = Some(value),
            _ => s.user = Some(value),
        }
        prop_assert!(s.into_config(false, None).validate().is_err());
    }

    /// Install dirs with spaces validate and stay a single `ExecStart` argument.
    #[test]
    fn prop_spaced_install_dir_is_quoted(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        let dir = format!("/srv/{a} {b}");
        let mut s = settings("hash".to_string(), None, 8080);
        s.dir = Some(PathBuf::from(&dir));
        let cfg = s.into_config(false, None);
        prop_assert!(cfg.validate().is_ok());

        let rendered = ServiceUnit::from_config(&cfg).render();
        let exec = format!("ExecStart=\"{dir}/.venv/bin/python\" \"{dir}/app.py\"\n");
        prop_assert!(rendered.contains(&exec), "{}", rendered);
    }

    /// Non-numeric API identifiers are rejected.
    #[test]
    fn prop_non_numeric_api_id_rejected(id in "[a-z][a-z0-9]{0,10}") {
        let mut s = settings("hash".to_string(), None, 8080);
        s.api_id = Some(IdValue::Text(id));
        prop_assert!(s.into_config(false, None).validate().is_err());
    }

    /// Names from the unit-name alphabet are accepted.
    #[test]
    fn prop_unit_names_from_alphabet_accepted(name in "[A-Za-z0-9_.@-]{1,40}") {
        prop_assert!(validate_unit_name(&name).is_ok());
    }

    /// Any character outside the alphabet is rejected.
    #[test]
    fn prop_unit_names_with_foreign_chars_rejected(
        head in "[a-z]{0,8}",
        bad in "[ /\\\\:;$`'\"]",
        tail in "[a-z]{0,8}",
    ) {
        let name = format!("{head}{bad}{tail}");
        prop_assert!(validate_unit_name(&name).is_err());
    }

    /// Flags win over the file layer for every field they set.
    #[test]
    fn prop_upper_layer_wins(upper in 1u16.., lower in 1u16..) {
        let flags = ProvisionSettings { port: Some(upper), ..ProvisionSettings::default() };
        let file = ProvisionSettings { port: Some(lower), ..ProvisionSettings::default() };
        prop_assert_eq!(flags.or(file).port, Some(upper));
    }
}

// ============================================================================
// Unit file and health classification
// ============================================================================

proptest! {
    /// The unit runs the entrypoint from the install dir as the service user.
    #[test]
    fn prop_unit_points_at_installation(
        service in "[a-z][a-z0-9-]{0,20}",
        user in "[a-z][a-z0-9_]{0,15}",
    ) {
        let mut s = settings("hash".to_string(), None, 8080);
        s.service = Some(service.clone());
        s.user = Some(user.clone());
        s.dir = None;
        let cfg = s.into_config(false, None);
        let unit = ServiceUnit::from_config(&cfg);
        let rendered = unit.render();

        prop_assert_eq!(unit.file_name(), format!("{service}.service"));
        let working_dir = format!("WorkingDirectory=/opt/{service}\n");
        let user_line = format!("User={user}\n");
        prop_assert!(rendered.contains(&working_dir));
        prop_assert!(rendered.contains(&user_line));
        prop_assert!(rendered.contains("Restart=always\n"));
    }

    /// Only 2xx answers count as healthy.
    #[test]
    fn prop_health_is_2xx(code in 100u16..600) {
        prop_assert_eq!(HealthStatus::from_code(code).is_healthy(), (200..300).contains(&code));
    }

    /// Probe URLs always target the status path on the bound port.
    #[test]
    fn prop_probe_url_shape(port in 1u16.., a in 1u8..=254, b in 0u8..=254) {
        let host = format!("10.{a}.{b}.1");
        let target = ProbeTarget::new(&host, port, None);
        prop_assert_eq!(target.url, format!("http://{host}:{port}/status"));
    }
}

#[test]
fn wildcard_bind_is_probed_on_loopback() {
    let target = ProbeTarget::new("0.0.0.0", 8080, Some("tok"));
    assert_eq!(target.url, "http://127.0.0.1:8080/status");
    assert_eq!(target.bearer.as_deref(), Some("tok"));
}
