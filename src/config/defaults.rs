//! Default value functions for configuration.

// =============================================================================
// Invite Defaults
// =============================================================================

pub fn default_store_path() -> String {
    "invites.redb".to_string()
}

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Accept Defaults
// =============================================================================

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_base_ms() -> u64 {
    500
}
