//! Input injection capability.

/// OS-level input failure.
#[derive(Debug, thiserror::Error)]
pub enum InjectorError {
    /// The key string could not be mapped to an injectable symbol.
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// Backend-specific failure (focus lost, permission, ...).
    #[error("injection failed: {0}")]
    Backend(String),
}

/// Synchronous keyboard injection, injected into the engine.
///
/// The scheduler serializes all calls on its own thread; implementations
/// never see overlapping press/release sequences.
pub trait InputInjector: Send + Sync {
    fn press(&self, key: &str) -> Result<(), InjectorError>;
    fn release(&self, key: &str) -> Result<(), InjectorError>;
}

/// Physical mouse state, read by the health monitor.
///
/// Auto-select yields to the player: while the right button is held the
/// monitor skips its tick entirely.
pub trait MouseState: Send + Sync {
    fn right_button_held(&self) -> bool;
}
