/// Whether transfers are audited at runtime.
///
/// Chosen once, when the auditor is built. Disabled means zero bookkeeping:
/// transfers become pass-throughs and handles unwrap without a consumed-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeChecks {
    #[default]
    Enabled,
    Disabled,
}

impl RuntimeChecks {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, RuntimeChecks::Enabled)
    }

    #[must_use]
    pub const fn from_bool(enabled: bool) -> Self {
        if enabled {
            RuntimeChecks::Enabled
        } else {
            RuntimeChecks::Disabled
        }
    }

    /// Parse a switch value such as `1`, `off` or `enabled`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" | "enabled" => Some(RuntimeChecks::Enabled),
            "0" | "false" | "off" | "no" | "disabled" => Some(RuntimeChecks::Disabled),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RuntimeChecks::Enabled => "enabled",
            RuntimeChecks::Disabled => "disabled",
        }
    }
}
