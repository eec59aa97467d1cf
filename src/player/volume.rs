/// Volume indicator shown next to the volume slider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VolumeIcon {
    Muted,
    Low,
    Full,
}

impl VolumeIcon {
    /// Muted at 0, low below 50, full from 50 up.
    pub fn for_percent(percent: f64) -> Self {
        if percent <= 0.0 {
            Self::Muted
        } else if percent < 50.0 {
            Self::Low
        } else {
            Self::Full
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Muted => "muted",
            Self::Low => "low",
            Self::Full => "full",
        }
    }
}

pub(super) fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}
