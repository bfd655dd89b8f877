//! Key combinations and the keyboard registration service.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::events::Modifiers;

/// A key combination (key + modifiers)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    /// The key code
    pub key: Key,
    /// Modifier keys
    pub modifiers: Modifiers,
}

impl KeyCombo {
    /// Create a new key combo
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Create a key combo without modifiers
    pub const fn key(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Add ctrl modifier
    pub const fn ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    /// Add shift modifier
    pub const fn shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    /// Add alt modifier
    pub const fn alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }

    /// Add meta modifier
    pub const fn meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("shift+")?;
        }
        if self.modifiers.meta {
            f.write_str("meta+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = KeybindError;

    /// Parse `"shift+down"`, `"ctrl+a"`, `"enter"` and similar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts
            .pop()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| KeybindError::Parse(s.to_string()))?;

        let mut combo = KeyCombo::key(key.parse()?);
        for modifier in parts {
            combo = match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => combo.ctrl(),
                "shift" => combo.shift(),
                "alt" => combo.alt(),
                "meta" | "cmd" | "super" => combo.meta(),
                _ => return Err(KeybindError::Parse(s.to_string())),
            };
        }
        Ok(combo)
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Character key
    Char(char),
    /// Enter/Return
    Enter,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => f.write_str("enter"),
            Key::Up => f.write_str("up"),
            Key::Down => f.write_str("down"),
        }
    }
}

impl FromStr for Key {
    type Err = KeybindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Key::Char(c)),
                    _ => Err(KeybindError::Parse(s.to_string())),
                }
            }
        }
    }
}

/// Errors from key parsing and the keyboard service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeybindError {
    /// The key description could not be parsed.
    #[error("invalid key combination: {0}")]
    Parse(String),
    /// The owner already registered a handler for this combination.
    #[error("{owner} already registered {combo}")]
    AlreadyRegistered { owner: String, combo: KeyCombo },
}

/// Handler invoked with the full pressed-key description.
pub type KeyHandler = Arc<dyn Fn(&KeyCombo) + Send + Sync>;

/// Service that dispatches key combinations to subscribers.
///
/// Registrations are scoped by an owner string so several grids can listen
/// to the same combination and each release only its own.
#[async_trait]
pub trait KeyboardService: Send + Sync {
    /// Subscribe `handler` to `combo`.
    async fn register(
        &self,
        owner: &str,
        combo: KeyCombo,
        handler: KeyHandler,
    ) -> Result<(), KeybindError>;

    /// Remove the owner's subscription to `combo`. Unknown subscriptions are ignored.
    async fn unregister(&self, owner: &str, combo: &KeyCombo) -> Result<(), KeybindError>;
}

/// In-process [`KeyboardService`].
///
/// The host feeds pressed keys to [`dispatch`](KeyboardRegistry::dispatch).
#[derive(Default)]
pub struct KeyboardRegistry {
    handlers: DashMap<KeyCombo, Vec<(String, KeyHandler)>>,
}

impl KeyboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every handler subscribed to `combo`. Returns how many ran.
    pub fn dispatch(&self, combo: &KeyCombo) -> usize {
        // Clone out of the map so handlers can touch the registry.
        let handlers: Vec<KeyHandler> = self
            .handlers
            .get(combo)
            .map(|entry| entry.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(combo);
        }
        handlers.len()
    }

    /// Number of subscriptions for a combination.
    pub fn subscriber_count(&self, combo: &KeyCombo) -> usize {
        self.handlers.get(combo).map(|entry| entry.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.iter().all(|entry| entry.is_empty())
    }
}

#[async_trait]
impl KeyboardService for KeyboardRegistry {
    async fn register(
        &self,
        owner: &str,
        combo: KeyCombo,
        handler: KeyHandler,
    ) -> Result<(), KeybindError> {
        let mut entry = self.handlers.entry(combo.clone()).or_default();
        if entry.iter().any(|(o, _)| o == owner) {
            return Err(KeybindError::AlreadyRegistered {
                owner: owner.to_string(),
                combo,
            });
        }
        entry.push((owner.to_string(), handler));
        Ok(())
    }

    async fn unregister(&self, owner: &str, combo: &KeyCombo) -> Result<(), KeybindError> {
        if let Some(mut entry) = self.handlers.get_mut(combo) {
            entry.retain(|(o, _)| o != owner);
        }
        self.handlers.remove_if(combo, |_, handlers| handlers.is_empty());
        Ok(())
    }
}

/// Keyboard subscriptions held by one grid.
///
/// Acquired once after the first render and released exactly once on
/// disposal; further releases are no-ops.
#[derive(Debug)]
pub struct KeySubscription {
    owner: String,
    combos: Vec<KeyCombo>,
    released: bool,
}

impl KeySubscription {
    /// Register `handler` for every combination, rolling back on failure.
    pub async fn acquire(
        service: &dyn KeyboardService,
        owner: impl Into<String>,
        combos: Vec<KeyCombo>,
        handler: KeyHandler,
    ) -> Result<Self, KeybindError> {
        let owner = owner.into();
        for (index, combo) in combos.iter().enumerate() {
            if let Err(e) = service
                .register(&owner, combo.clone(), Arc::clone(&handler))
                .await
            {
                for done in &combos[..index] {
                    let _ = service.unregister(&owner, done).await;
                }
                return Err(e);
            }
        }
        log::debug!("[keys] {} registered {} combinations", owner, combos.len());
        Ok(Self {
            owner,
            combos,
            released: false,
        })
    }

    /// Unregister every combination. Safe to call more than once.
    pub async fn release(&mut self, service: &dyn KeyboardService) -> Result<(), KeybindError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        for combo in &self.combos {
            service.unregister(&self.owner, combo).await?;
        }
        log::debug!("[keys] {} released", self.owner);
        Ok(())
    }

    /// Returns `true` once released.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// The registered combinations.
    pub fn combos(&self) -> &[KeyCombo] {
        &self.combos
    }
}
