//! Unit tests for shell quoting

use homelab_backup::utils::shell::quote;
use std::process::Command;
use test_utils::hostile_passwords;

#[test]
fn test_quote_triple_quote_example() {
    assert_eq!(quote("q'q'q"), r#"'q'"'"'q'"'"'q'"#);
}

#[cfg(unix)]
#[test]
fn test_sh_reads_back_every_hostile_value() {
    for value in hostile_passwords() {
        let output = Command::new("sh")
            .arg("-c")
            .arg(format!("printf %s {}", quote(value)))
            .output()
            .unwrap();

        assert!(output.status.success(), "sh rejected {:?}", value);
        assert_eq!(String::from_utf8_lossy(&output.stdout), value);
    }
}

#[cfg(unix)]
#[test]
fn test_quoted_value_is_a_single_word() {
    for value in hostile_passwords() {
        let output = Command::new("sh")
            .arg("-c")
            .arg(format!("set -- {}; printf %s $#", quote(value)))
            .output()
            .unwrap();

        assert_eq!(String::from_utf8_lossy(&output.stdout), "1", "{:?}", value);
    }
}
