// Fixed-capacity lock label. Copies the caller's string so a lock can be
// named at runtime without alloc; truncates on a char boundary.

use core::fmt;

pub const LABEL_CAP: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LockLabel {
    buf: [u8; LABEL_CAP],
    len: u8,
}

impl LockLabel {
    pub const EMPTY: Self = Self {
        buf: [0u8; LABEL_CAP],
        len: 0,
    };

    pub fn new(s: &str) -> Self {
        let mut n = s.len().min(LABEL_CAP);
        while !s.is_char_boundary(n) {
            n -= 1;
        }
        let mut label = Self::EMPTY;
        label.buf[..n].copy_from_slice(&s.as_bytes()[..n]);
        label.len = n as u8;
        label
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or("?")
    }
}

impl fmt::Display for LockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for LockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_are_kept() {
        assert_eq!(LockLabel::new("sensor_read").as_str(), "sensor_read");
        assert_eq!(LockLabel::new(""), LockLabel::EMPTY);
    }

    #[test]
    fn long_labels_truncate() {
        let long = "a".repeat(LABEL_CAP + 10);
        assert_eq!(LockLabel::new(&long).as_str().len(), LABEL_CAP);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 31 ASCII bytes then a 2-byte char straddling the cap
        let s = format!("{}é", "x".repeat(LABEL_CAP - 1));
        let label = LockLabel::new(&s);
        assert_eq!(label.as_str(), "x".repeat(LABEL_CAP - 1));
    }
}
