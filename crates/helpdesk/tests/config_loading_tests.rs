//! Table-driven tests for configuration loading and validation.

use std::io::Write;
use std::path::PathBuf;

use helpdesk::config::{load_config, load_config_from_str};

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const JSON_CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{
            "imap_host": "imap.example.com",
            "username": "support@example.com",
            "password_env_var": "HELPDESK_PASSWORD"
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "imap_host": "imap.example.com",
            "imap_port": 1993,
            "use_tls": true,
            "username": "support@example.com",
            "password_file": "/run/secrets/imap",
            "folder": "Support",
            "ignore_autoreply": false,
            "mark_seen": false,
            "database_path": "/var/lib/helpdesk/helpdesk.db",
            "attachments_directory": "/var/lib/helpdesk/attachments"
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "missing_password_source",
        config_json: r#"{
            "imap_host": "imap.example.com",
            "username": "support@example.com"
        }"#,
        should_succeed: false,
        expected_error: Some("password"),
    },
    ConfigTestCase {
        name: "zero_port",
        config_json: r#"{
            "imap_host": "imap.example.com",
            "imap_port": 0,
            "username": "support@example.com",
            "password": "secret"
        }"#,
        should_succeed: false,
        expected_error: Some("imap_port"),
    },
    ConfigTestCase {
        name: "empty_username",
        config_json: r#"{
            "imap_host": "imap.example.com",
            "username": "",
            "password": "secret"
        }"#,
        should_succeed: false,
        expected_error: Some("username"),
    },
    ConfigTestCase {
        name: "empty_folder",
        config_json: r#"{
            "imap_host": "imap.example.com",
            "username": "support@example.com",
            "password": "secret",
            "folder": ""
        }"#,
        should_succeed: false,
        expected_error: Some("folder"),
    },
    ConfigTestCase {
        name: "wrong_type",
        config_json: r#"{
            "imap_host": "imap.example.com",
            "username": "support@example.com",
            "password": "secret",
            "mark_seen": "yes"
        }"#,
        should_succeed: false,
        expected_error: Some("parse"),
    },
    ConfigTestCase {
        name: "invalid_json",
        config_json: "{ not json",
        should_succeed: false,
        expected_error: Some("parse"),
    },
];

#[test]
fn test_json_config_loading() {
    for test_case in JSON_CONFIG_TESTS {
        let result = load_config_from_str(test_case.config_json);

        if test_case.should_succeed {
            assert!(
                result.is_ok(),
                "Test '{}': Expected success but got error: {:?}",
                test_case.name,
                result.err()
            );
        } else {
            assert!(
                result.is_err(),
                "Test '{}': Expected error but got success",
                test_case.name
            );

            if let Some(expected_error) = test_case.expected_error {
                let error_msg = result.err().unwrap().to_string();
                assert!(
                    error_msg.contains(expected_error),
                    "Test '{}': Expected error containing '{}', got '{}'",
                    test_case.name,
                    expected_error,
                    error_msg
                );
            }
        }
    }
}

#[test]
fn test_defaults_applied() {
    let config = load_config_from_str(JSON_CONFIG_TESTS[0].config_json).unwrap();

    assert_eq!(config.imap_port, 993);
    assert!(config.use_tls);
    assert_eq!(config.folder, "INBOX");
    assert!(config.ignore_autoreply);
    assert!(config.mark_seen);
    assert!(config
        .resolved_attachments_directory()
        .unwrap()
        .ends_with(".helpdesk/attachments"));
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(JSON_CONFIG_TESTS[1].config_json.as_bytes())
        .unwrap();

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.imap_port, 1993);
    assert_eq!(config.folder, "Support");
    assert!(!config.ignore_autoreply);
    assert!(!config.mark_seen);
    assert_eq!(
        config.resolved_database_path().unwrap(),
        PathBuf::from("/var/lib/helpdesk/helpdesk.db")
    );
}
