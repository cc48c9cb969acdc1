//! Maps the pipeline flags onto a quality tier and its scene parameters.
//!
//! | scrolling | class  | particles | stars | segments | effects |
//! |-----------|--------|-----------|-------|----------|---------|
//! | no        | Normal | 800       | 2000  | 24       | on      |
//! | no        | Low    | 300       | 500   | 12       | off     |
//! | yes       | any    | 100       | 200   | 8        | off     |
//!
//! While scrolling, the starfield and particle field are attenuated once more
//! on top of the scrolling row; see [`QualityParameters::starfield_count`] and
//! [`QualityParameters::particle_field_count`].

use crate::config::{
    LIGHT_BLEND_NORMAL, LIGHT_BLEND_REDUCED, MAX_PIXEL_RATIO, SCROLLING_PIXEL_RATIO,
    SCROLL_DENSITY_SCALE, SCROLL_MIN_STARS, STAR_SPEED_LOW, STAR_SPEED_NORMAL,
    STAR_SPEED_SCROLLING,
};
use crate::signals::PerformanceClass;
use serde::Serialize;
use std::fmt;

/// Which row of the table is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityTier {
    Normal,
    Low,
    Scrolling,
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityTier::Normal => write!(f, "normal"),
            QualityTier::Low => write!(f, "low"),
            QualityTier::Scrolling => write!(f, "scrolling"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityParameters {
    pub tier: QualityTier,
    pub particle_count: u32,
    /// Star count before scroll attenuation.
    pub star_count: u32,
    pub sphere_segments: u32,
    pub effects_enabled: bool,
}

impl QualityParameters {
    pub const NORMAL: Self = Self {
        tier: QualityTier::Normal,
        particle_count: 800,
        star_count: 2000,
        sphere_segments: 24,
        effects_enabled: true,
    };

    pub const LOW: Self = Self {
        tier: QualityTier::Low,
        particle_count: 300,
        star_count: 500,
        sphere_segments: 12,
        effects_enabled: false,
    };

    pub const SCROLLING: Self = Self {
        tier: QualityTier::Scrolling,
        particle_count: 100,
        star_count: 200,
        sphere_segments: 8,
        effects_enabled: false,
    };

    pub fn is_scrolling(&self) -> bool {
        self.tier == QualityTier::Scrolling
    }

    /// Anything below the normal tier runs slower motion and plain materials.
    pub fn reduced_motion(&self) -> bool {
        self.tier != QualityTier::Normal
    }

    /// Stars handed to the starfield: scaled down while scrolling, never below the floor.
    pub fn starfield_count(&self) -> u32 {
        if self.is_scrolling() {
            scale_down(self.star_count).max(SCROLL_MIN_STARS)
        } else {
            self.star_count
        }
    }

    /// Points handed to the particle field: scaled down while scrolling.
    pub fn particle_field_count(&self) -> u32 {
        if self.is_scrolling() {
            scale_down(self.particle_count)
        } else {
            self.particle_count
        }
    }

    pub fn star_speed(&self) -> f32 {
        match self.tier {
            QualityTier::Normal => STAR_SPEED_NORMAL,
            QualityTier::Low => STAR_SPEED_LOW,
            QualityTier::Scrolling => STAR_SPEED_SCROLLING,
        }
    }

    /// Fraction of the remaining distance the mouse light covers each frame.
    pub fn light_blend(&self) -> f32 {
        if self.reduced_motion() {
            LIGHT_BLEND_REDUCED
        } else {
            LIGHT_BLEND_NORMAL
        }
    }

    /// Renderer pixel ratio for a display with `device_pixel_ratio`.
    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        if self.is_scrolling() {
            SCROLLING_PIXEL_RATIO
        } else {
            device_pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO)
        }
    }

    /// The environment map follows the post-processing stack.
    pub fn environment_enabled(&self) -> bool {
        self.effects_enabled
    }
}

fn scale_down(count: u32) -> u32 {
    (f64::from(count) * SCROLL_DENSITY_SCALE).floor() as u32
}

/// Pure resolution of the current flags. A manual override counts as `Low`
/// even if the class passed in has not caught up yet.
pub fn resolve(
    class: PerformanceClass,
    is_scrolling: bool,
    manual_override: bool,
) -> QualityParameters {
    if is_scrolling {
        QualityParameters::SCROLLING
    } else if class.is_low() || manual_override {
        QualityParameters::LOW
    } else {
        QualityParameters::NORMAL
    }
}
