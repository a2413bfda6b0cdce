//! Command lines and output matching for the Windows Software Licensing
//! service.
//!
//! Keys are installed and activated through `slmgr.vbs` (run via
//! `cscript`), and activation state is confirmed two independent ways:
//! the human-readable `slmgr /xpr` report and a `wmic` query over the
//! `SoftwareLicensingProduct` records. Both checks are substring/field
//! matching on localized, version-drifting tool output, so the matching
//! tables below are data, not control flow.

use std::env;

const DEFAULT_SYSTEM_ROOT: &str = r"C:\Windows";

/// Recognized "permanently activated" phrases in `slmgr /xpr` output,
/// per locale, stored lowercase. slmgr localizes its report, so each
/// supported locale contributes its phrases as a row here; supporting a
/// new locale means adding a row, nothing else. The matching stays
/// inherently fragile against OS and locale drift, which is why the
/// wmic record query exists as an independent fallback.
pub const PERMANENT_ACTIVATION_PHRASES: &[(&str, &[&str])] = &[
    ("en", &["permanently activated", "is permanently activated"]),
    ("de", &["dauerhaft aktiviert", "ist dauerhaft aktiviert"]),
];

/// `LicenseStatus` values reported by `SoftwareLicensingProduct`:
/// 0 unlicensed, 1 licensed, 2 notification, 3 initial grace,
/// 4 additional grace. Only 1 counts as activated.
const LICENSED_STATUS: i32 = 1;

/// Path to `slmgr.vbs`, resolved from `%SystemRoot%`.
fn slmgr_script_path() -> String {
    let root = env::var("SystemRoot").unwrap_or_else(|_| DEFAULT_SYSTEM_ROOT.to_string());
    format!(r"{root}\System32\slmgr.vbs")
}

fn slmgr_argv(action: &[&str]) -> Vec<String> {
    let mut argv = vec![
        "cscript".to_string(),
        "//nologo".to_string(),
        slmgr_script_path(),
    ];
    argv.extend(action.iter().map(|s| s.to_string()));
    argv
}

/// Command line installing a product key (`slmgr /ipk <key>`).
pub fn install_key_argv(key: &str) -> Vec<String> {
    slmgr_argv(&["/ipk", key])
}

/// Command line requesting online activation (`slmgr /ato`).
pub fn activate_argv() -> Vec<String> {
    slmgr_argv(&["/ato"])
}

/// Command line for the human-readable activation report (`slmgr /xpr`).
pub fn expiry_status_argv() -> Vec<String> {
    slmgr_argv(&["/xpr"])
}

/// Command line querying license records for every product with a key
/// installed, in `key=value` list format.
pub fn license_records_argv() -> Vec<String> {
    [
        "wmic",
        "path",
        "SoftwareLicensingProduct",
        "where",
        "PartialProductKey is not null",
        "get",
        "Name,LicenseStatus",
        "/format:list",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Whether `slmgr /xpr` output reports a permanently activated host.
///
/// Case-insensitive substring match against the locale phrase table.
pub fn reports_permanent_activation(output: &str) -> bool {
    let text = output.to_lowercase();
    PERMANENT_ACTIVATION_PHRASES
        .iter()
        .any(|(_, phrases)| phrases.iter().any(|phrase| text.contains(phrase)))
}

/// Whether wmic license records contain a product with `LicenseStatus=1`.
///
/// Two matching strategies, both required: a direct substring match on the
/// usual `/format:list` layout, and a line scan parsing `key=value` pairs.
/// wmic's exact formatting (field padding, spacing around `=`) differs
/// across Windows versions, and neither strategy alone covers all of them.
pub fn reports_licensed_record(output: &str) -> bool {
    let text = output.to_lowercase();

    // Usual /format:list layout.
    if text.contains("licensestatus=1") || text.contains("licensestatus= 1") {
        return true;
    }

    // Padded or reformatted variants: scan key=value lines.
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("licensestatus") {
            if let Some((_, value)) = rest.split_once('=') {
                if value.trim().parse::<i32>() == Ok(LICENSED_STATUS) {
                    return true;
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_key_argv_shape() {
        let argv = install_key_argv("ABCDE-12345");
        assert_eq!(argv[0], "cscript");
        assert_eq!(argv[1], "//nologo");
        assert!(argv[2].ends_with("slmgr.vbs"));
        assert_eq!(argv[3], "/ipk");
        assert_eq!(argv[4], "ABCDE-12345");
    }

    #[test]
    fn test_status_argvs_use_slmgr_and_wmic() {
        assert!(activate_argv().contains(&"/ato".to_string()));
        assert!(expiry_status_argv().contains(&"/xpr".to_string()));

        let records = license_records_argv();
        assert_eq!(records[0], "wmic");
        assert!(records.contains(&"SoftwareLicensingProduct".to_string()));
        assert!(records.contains(&"/format:list".to_string()));
    }

    #[test]
    fn test_permanent_activation_phrases_match_english() {
        assert!(reports_permanent_activation(
            "The machine is permanently activated."
        ));
        assert!(reports_permanent_activation(
            "THE MACHINE IS PERMANENTLY ACTIVATED."
        ));
    }

    #[test]
    fn test_permanent_activation_phrases_match_german() {
        assert!(reports_permanent_activation(
            "Der Computer ist dauerhaft aktiviert."
        ));
    }

    #[test]
    fn test_permanent_activation_rejects_other_output() {
        assert!(!reports_permanent_activation(
            "Windows is in Notification mode"
        ));
        assert!(!reports_permanent_activation(
            "Volume activation will expire 12/31/2026"
        ));
        assert!(!reports_permanent_activation(""));
    }

    #[test]
    fn test_licensed_record_direct_match() {
        let out = "Name=Windows(R), Professional edition\nLicenseStatus=1";
        assert!(reports_licensed_record(out));
        assert!(reports_licensed_record("licensestatus=1"));
        assert!(reports_licensed_record("LicenseStatus= 1"));
    }

    #[test]
    fn test_licensed_record_line_scan_match() {
        // Padded layout only the key=value scan catches.
        assert!(reports_licensed_record("LicenseStatus   =   1"));
        assert!(reports_licensed_record("  licensestatus =1  "));
    }

    #[test]
    fn test_licensed_record_rejects_other_statuses() {
        assert!(!reports_licensed_record("LicenseStatus=0"));
        assert!(!reports_licensed_record("LicenseStatus=4"));
        assert!(!reports_licensed_record("LicenseStatus = 2"));
        assert!(!reports_licensed_record("Name=Windows(R)\n"));
        assert!(!reports_licensed_record(""));
    }

    #[test]
    fn test_licensed_record_multiple_products() {
        let out = "Name=Office\nLicenseStatus=0\n\nName=Windows(R), Professional edition\nLicenseStatus=1\n";
        assert!(reports_licensed_record(out));

        let out = "Name=Office\nLicenseStatus=0\n\nName=Windows\nLicenseStatus=2\n";
        assert!(!reports_licensed_record(out));
    }
}
