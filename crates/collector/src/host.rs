#![forbid(unsafe_code)]

use tracing::warn;

/// Stable host identity attached to every audit line. Resolved once at
/// startup and cached for the process lifetime.
///
/// `id_key` is the token downstream parsers key on (`uuid` on Linux, `sid`
/// on Windows), so it stays fixed per platform even when the value itself
/// could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub id_key: &'static str,
    pub id: String,
    pub hostname: String,
}

impl HostIdentity {
    pub fn resolve() -> Self {
        let hostname = sysinfo::System::host_name().unwrap_or_else(|| {
            warn!("hostname unavailable");
            "unknown".to_string()
        });
        let (id_key, id) = machine_id();
        Self {
            id_key,
            id,
            hostname,
        }
    }
}

#[cfg(target_os = "linux")]
fn machine_id() -> (&'static str, String) {
    for path in ["/etc/machine-id", "/sys/class/dmi/id/product_uuid"] {
        if let Ok(text) = std::fs::read_to_string(path) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return ("uuid", trimmed.to_string());
            }
        }
    }
    warn!("machine id unavailable");
    ("uuid", "unknown".to_string())
}

#[cfg(windows)]
fn machine_id() -> (&'static str, String) {
    // The computer SID would come from the Win32 security API; until that is
    // wired up the key stays `sid` so downstream parsers see a stable token.
    warn!("machine sid unavailable");
    ("sid", "unknown".to_string())
}

#[cfg(not(any(target_os = "linux", windows)))]
fn machine_id() -> (&'static str, String) {
    ("uuid", "unknown".to_string())
}
