//! Global hotkey capability and key-string validation.
//!
//! OS registration (or portal sessions on Wayland) is the embedder's
//! problem; the engine only hands over free-form combo strings like
//! `"ctrl+f11"` and a callback, and keeps the returned handles so it can
//! swap bindings atomically.

/// Opaque token for a registered hotkey, minted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyHandle(pub u64);

/// Hotkey validation and registration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey for '{role}' is empty")]
    EmptyKey { role: &'static str },

    #[error("start and stop hotkeys are both '{0}'")]
    DuplicateKey(String),

    #[error("failed to register '{combo}': {reason}")]
    Registration { combo: String, reason: String },
}

/// Global hotkey registration, injected into the control plane.
pub trait HotkeyRegistry: Send + Sync {
    /// Register `combo`; `callback` fires on activation (on an arbitrary
    /// registry-owned thread, so it must be cheap and non-blocking).
    fn register(
        &self,
        combo: &str,
        callback: Box<dyn Fn() + Send + Sync>,
    ) -> Result<HotkeyHandle, HotkeyError>;

    /// Remove a previously registered binding. Unknown handles are ignored.
    fn unregister(&self, handle: HotkeyHandle);
}

/// Validate a start/stop hotkey pair before touching the registry.
///
/// Keys must be non-empty (after trimming) and distinct between the two
/// roles. Comparison is case-insensitive since combo strings are.
pub fn validate_pair(start_key: &str, stop_key: &str) -> Result<(), HotkeyError> {
    if start_key.trim().is_empty() {
        return Err(HotkeyError::EmptyKey { role: "start" });
    }
    if stop_key.trim().is_empty() {
        return Err(HotkeyError::EmptyKey { role: "stop" });
    }
    if start_key.trim().eq_ignore_ascii_case(stop_key.trim()) {
        return Err(HotkeyError::DuplicateKey(start_key.trim().to_string()));
    }
    Ok(())
}
