use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for component IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Next candidate suffix for generated IDs.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A lightweight, interned identifier for component instances.
/// Internally a 4-byte `Spur` index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(Spur);

impl ComponentId {
    /// Intern a string as a ComponentId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ComponentId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh ID (`comp_<n>`).
    ///
    /// Every ID this process has ever seen is interned, so skipping
    /// candidates that are already interned guarantees the result differs
    /// from all existing IDs, including ones that came in through a load.
    pub fn generate() -> Self {
        Self::with_prefix("comp")
    }

    /// Generate a fresh ID with a custom prefix (e.g. `button_3`).
    pub fn with_prefix(prefix: &str) -> Self {
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}_{n}");
            if !INTERNER.contains(&candidate) {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ComponentId::intern(&s))
    }
}
