//! FileSize Type-Safe Wrapper
//!
//! Byte counts with safe arithmetic and target-size helpers.

use std::fmt;

// ============================================================================
// FileSize Newtype
// ============================================================================

/// A file size in bytes.
///
/// # Examples
/// ```
/// use shared_utils::types::file_size::FileSize;
///
/// let target = FileSize::from_megabytes(25.0);
/// assert_eq!(target.bytes(), 25 * 1024 * 1024);
///
/// let actual = FileSize::new(27 * 1024 * 1024);
/// let dev = actual.deviation_from(target).unwrap();
/// assert!(dev > 0.07 && dev < 0.09);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileSize(u64);

impl FileSize {
    pub const ZERO: FileSize = FileSize(0);

    /// 1 KB
    pub const KB: u64 = 1024;
    /// 1 MB
    pub const MB: u64 = 1024 * 1024;
    /// 1 GB
    pub const GB: u64 = 1024 * 1024 * 1024;

    #[inline]
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Create from a megabyte count (1 MB = 1024 * 1024 bytes).
    ///
    /// Fractional megabytes are truncated to whole bytes.
    pub fn from_megabytes(mb: f64) -> Self {
        Self((mb * Self::MB as f64) as u64)
    }

    #[inline]
    pub const fn bytes(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn saturating_sub(&self, other: FileSize) -> FileSize {
        FileSize(self.0.saturating_sub(other.0))
    }

    /// Signed relative deviation from `target`: (self - target) / target.
    ///
    /// Negative means smaller than the target, positive larger.
    /// Returns `None` if `target` is zero.
    pub fn deviation_from(&self, target: FileSize) -> Option<f64> {
        if target.0 == 0 {
            None
        } else {
            Some((self.0 as f64 - target.0 as f64) / target.0 as f64)
        }
    }

    /// Ratio target / self, the linear bitrate correction factor.
    ///
    /// Returns `None` if `self` is zero.
    pub fn correction_toward(&self, target: FileSize) -> Option<f64> {
        if self.0 == 0 {
            None
        } else {
            Some(target.0 as f64 / self.0 as f64)
        }
    }

    /// Format with an auto-selected unit.
    pub fn display(&self) -> String {
        if self.0 >= Self::GB {
            format!("{:.2} GB", self.0 as f64 / Self::GB as f64)
        } else if self.0 >= Self::MB {
            format!("{:.2} MB", self.0 as f64 / Self::MB as f64)
        } else if self.0 >= Self::KB {
            format!("{:.2} KB", self.0 as f64 / Self::KB as f64)
        } else {
            format!("{} B", self.0)
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl fmt::Debug for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileSize({} = {})", self.0, self.display())
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Default for FileSize {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for FileSize {
    fn from(bytes: u64) -> Self {
        Self::new(bytes)
    }
}

impl From<FileSize> for u64 {
    fn from(size: FileSize) -> Self {
        size.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_megabytes() {
        assert_eq!(FileSize::from_megabytes(25.0).bytes(), 26_214_400);
        assert_eq!(FileSize::from_megabytes(0.5).bytes(), 524_288);
        assert_eq!(FileSize::from_megabytes(0.0).bytes(), 0);
    }

    #[test]
    fn test_deviation_from() {
        let target = FileSize::from_megabytes(25.0);

        // 27 MB against 25 MB: +8%
        let actual = FileSize::from_megabytes(27.0);
        let dev = actual.deviation_from(target).unwrap();
        assert!((dev - 0.08).abs() < 0.001);

        // 24 MB against 25 MB: -4%
        let actual = FileSize::from_megabytes(24.0);
        let dev = actual.deviation_from(target).unwrap();
        assert!((dev + 0.04).abs() < 0.001);

        // Exact hit
        assert_eq!(target.deviation_from(target), Some(0.0));

        // Zero target
        assert_eq!(actual.deviation_from(FileSize::ZERO), None);
    }

    #[test]
    fn test_correction_toward() {
        let target = FileSize::new(25);
        let actual = FileSize::new(27);
        let corr = actual.correction_toward(target).unwrap();
        assert!((corr - 25.0 / 27.0).abs() < 1e-9);

        assert_eq!(FileSize::ZERO.correction_toward(target), None);
    }

    #[test]
    fn test_saturating_sub() {
        let a = FileSize::new(100);
        let b = FileSize::new(30);
        assert_eq!(a.saturating_sub(b).bytes(), 70);
        assert_eq!(b.saturating_sub(a).bytes(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(FileSize::new(500).display(), "500 B");
        assert_eq!(FileSize::new(1024).display(), "1.00 KB");
        assert_eq!(FileSize::new(1024 * 1024).display(), "1.00 MB");
        assert_eq!(FileSize::new(1024 * 1024 * 1024).display(), "1.00 GB");
    }
}
