// Power manager configuration.
// Key names and defaults match the loop-interval PM component schema:
//   min_loop_interval_ms = 16
//   max_loop_interval_ms = 200
//   lock_policy          = last_writer | counted

use core::fmt;

pub const DEFAULT_MIN_LOOP_INTERVAL_MS: u16 = 16;
pub const DEFAULT_MAX_LOOP_INTERVAL_MS: u16 = 200;

/// What releasing an interval lock does to the loop interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// Every release restores the max interval, even while other locks
    /// are still held.
    #[default]
    LastWriter,
    /// Fall back to the max interval only once no lock is held and
    /// warm-up is over.
    Counted,
}

impl LockPolicy {
    pub const fn name(self) -> &'static str {
        match self {
            LockPolicy::LastWriter => "last_writer",
            LockPolicy::Counted => "counted",
        }
    }

    pub fn parse(s: &[u8]) -> Option<Self> {
        match s {
            b"counted" => Some(LockPolicy::Counted),
            b"last_writer" => Some(LockPolicy::LastWriter),
            _ => None,
        }
    }
}

impl fmt::Display for LockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// min interval is slower than the max; warm-up end and lock release
    /// would speed the loop up instead of slowing it down
    MinAboveMax { min: u16, max: u16 },
    UnknownKey,
    BadValue,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MinAboveMax { min, max } => {
                write!(f, "min loop interval {}ms above max {}ms", min, max)
            }
            ConfigError::UnknownKey => f.write_str("unknown key"),
            ConfigError::BadValue => f.write_str("bad value"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmConfig {
    pub min_loop_interval_ms: u16,
    pub max_loop_interval_ms: u16,
    pub policy: LockPolicy,
}

impl Default for PmConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PmConfig {
    pub const fn defaults() -> Self {
        Self {
            min_loop_interval_ms: DEFAULT_MIN_LOOP_INTERVAL_MS,
            max_loop_interval_ms: DEFAULT_MAX_LOOP_INTERVAL_MS,
            policy: LockPolicy::LastWriter,
        }
    }

    pub const fn with_intervals(mut self, min_ms: u16, max_ms: u16) -> Self {
        self.min_loop_interval_ms = min_ms;
        self.max_loop_interval_ms = max_ms;
        self
    }

    pub const fn with_policy(mut self, policy: LockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// min > max is accepted everywhere else; this is the one place that
    /// calls it out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_loop_interval_ms > self.max_loop_interval_ms {
            return Err(ConfigError::MinAboveMax {
                min: self.min_loop_interval_ms,
                max: self.max_loop_interval_ms,
            });
        }
        Ok(())
    }

    /// Apply one `key = value` pair. Leading/trailing whitespace is
    /// ignored; on error the config is left untouched.
    pub fn apply(&mut self, key: &[u8], val: &[u8]) -> Result<(), ConfigError> {
        let val = trim(val);
        match trim(key) {
            b"min_loop_interval_ms" => {
                self.min_loop_interval_ms = parse_u16(val).ok_or(ConfigError::BadValue)?;
            }
            b"max_loop_interval_ms" => {
                self.max_loop_interval_ms = parse_u16(val).ok_or(ConfigError::BadValue)?;
            }
            b"lock_policy" => {
                self.policy = LockPolicy::parse(val).ok_or(ConfigError::BadValue)?;
            }
            _ => return Err(ConfigError::UnknownKey),
        }
        Ok(())
    }
}

fn trim(s: &[u8]) -> &[u8] {
    let mut start = 0;
    let mut end = s.len();
    while start < end && matches!(s[start], b' ' | b'\t' | b'\r' | b'\n') {
        start += 1;
    }
    while end > start && matches!(s[end - 1], b' ' | b'\t' | b'\r' | b'\n') {
        end -= 1;
    }
    &s[start..end]
}

fn parse_u16(s: &[u8]) -> Option<u16> {
    if s.is_empty() {
        return None;
    }
    let mut val: u16 = 0;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        val = val.checked_mul(10)?.checked_add((b - b'0') as u16)?;
    }
    Some(val)
}
