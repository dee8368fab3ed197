//! What the augmentation chain decided for one clip.
//!
//! An [`AugmentationDecision`] is ephemeral: it is logged, forwarded to the
//! event hook and then dropped.  `None` means the effect did not fire.

use std::fmt;

/// Millisecond window kept by the trim step, `[start_ms, end_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimWindow {
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Sampled parameters of every effect that fired, in chain order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AugmentationDecision {
    pub speed_factor: Option<f64>,
    pub semitone_shift: Option<f64>,
    pub volume_delta_db: Option<f64>,
    pub trim: Option<TrimWindow>,
}

impl AugmentationDecision {
    /// `true` when no effect fired.
    pub fn is_identity(&self) -> bool {
        self.speed_factor.is_none()
            && self.semitone_shift.is_none()
            && self.volume_delta_db.is_none()
            && self.trim.is_none()
    }

    /// Whether a rate-changing step ran (the output is then at 16 kHz).
    pub fn changes_rate(&self) -> bool {
        self.speed_factor.is_some() || self.semitone_shift.is_some()
    }
}

impl fmt::Display for AugmentationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return write!(f, "unmodified");
        }
        let mut parts = Vec::with_capacity(4);
        if let Some(factor) = self.speed_factor {
            parts.push(format!("speed x{factor:.2}"));
        }
        if let Some(st) = self.semitone_shift {
            parts.push(format!("pitch {st:+.2} st"));
        }
        if let Some(db) = self.volume_delta_db {
            parts.push(format!("volume {db:+.2} dB"));
        }
        if let Some(t) = self.trim {
            parts.push(format!("trim {}-{} ms", t.start_ms, t.end_ms));
        }
        write!(f, "{}", parts.join(", "))
    }
}
