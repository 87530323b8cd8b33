//! Build provenance
//!
//! Serial numbers, build timestamps and digital signatures label a run for
//! diagnostics. None of it affects pipeline results.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

/// Prefix shared by every serial number
pub const SERIAL_PREFIX: &str = "SZAIV3-";

/// Signed in place of a file that cannot be read
pub const FALLBACK_CODE: &str = "Prototype Code String (Fallback)";

/// Host name reported when the system refuses to give one
pub const UNKNOWN_HOST: &str = "unknown-host";

/// Identity of one coordinator instance
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub serial_number: String,
    /// UTC, `%Y-%m-%d %H:%M:%S`
    pub build_time: String,
    pub host: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            serial_number: generate_serial_number(),
            build_time: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            host: host_name(),
        }
    }
}

/// Lowercase hex SHA-256 of `content`
pub fn digital_signature(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// `SZAIV3-` followed by eight upper-case hex digits
pub fn generate_serial_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}{}", SERIAL_PREFIX, id[..8].to_uppercase())
}

/// Sign the contents of `path`, or the fallback string if it cannot be read
pub fn sign_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(content) => digital_signature(&content),
        Err(e) => {
            warn!(
                "Could not read {} for digital signature: {}",
                path.display(),
                e
            );
            digital_signature(FALLBACK_CODE.as_bytes())
        }
    }
}

fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_signature_is_stable_sha256() {
        assert_eq!(
            digital_signature(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digital_signature(b"abc"), digital_signature(b"abc"));
        assert_ne!(digital_signature(b"abc"), digital_signature(b"abd"));
    }

    #[test]
    fn test_serial_number_format() {
        let serial = generate_serial_number();

        assert!(serial.starts_with(SERIAL_PREFIX));
        let suffix = &serial[SERIAL_PREFIX.len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_serial_numbers_differ() {
        assert_ne!(generate_serial_number(), generate_serial_number());
    }

    #[test]
    fn test_sign_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();

        assert_eq!(sign_file(file.path()), digital_signature(b"abc"));
    }

    #[test]
    fn test_sign_missing_file_uses_fallback() {
        assert_eq!(
            sign_file(Path::new("/nonexistent/slizzai")),
            digital_signature(FALLBACK_CODE.as_bytes())
        );
    }

    #[test]
    fn test_build_info_time_format() {
        let info = BuildInfo::current();
        assert_eq!(info.build_time.len(), "2025-06-09 12:00:00".len());
        assert!(!info.host.is_empty());
    }
}
