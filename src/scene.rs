//! Per-frame composition of the backdrop scene.
//!
//! [`SceneComposer`] is driven once per displayed frame through
//! [`FrameConsumer::on_frame`]. Each call resolves the quality parameters from
//! the shared [`BackdropState`], advances the motion of every primitive by the
//! real time elapsed since the previous frame, and hands a [`SceneFrame`] to a
//! [`SceneSink`]. The sink owns the actual 3D library; the composer keeps no
//! timers and performs no I/O.

use crate::config::{
    BLOOM_INTENSITY, BLOOM_LUMINANCE_SMOOTHING, BLOOM_LUMINANCE_THRESHOLD, CAMERA_FOV_DEG,
    CAMERA_Z, CHROMATIC_OFFSET, PARTICLE_SPREAD, PARTICLE_STEP_NORMAL, PARTICLE_STEP_REDUCED,
    PARTICLE_TICK_NORMAL_S, PARTICLE_TICK_REDUCED_S, PARTICLE_Y_RATIO, SHAPE_FLOATS, SPHERE_FLOAT,
    SPHERE_RADIUS, SPHERE_SPIN_NORMAL, SPHERE_SPIN_REDUCED, VIGNETTE_DARKNESS, VIGNETTE_OFFSET,
};
use crate::quality::{QualityParameters, QualityTier};
use crate::state::BackdropState;
use crate::BackdropError;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;

/// Registered with the host rendering loop and called once per frame.
pub trait FrameConsumer {
    /// `elapsed` is the time since the previous frame, in seconds.
    fn on_frame(&mut self, elapsed: f64);
}

impl<F: FnMut(f64)> FrameConsumer for F {
    fn on_frame(&mut self, elapsed: f64) {
        self(elapsed)
    }
}

/// Receives the composed frame and turns it into draw calls.
pub trait SceneSink {
    fn draw(&mut self, frame: &SceneFrame) -> Result<(), BackdropError>;
}

/// Continuous inputs written by host event listeners and read every frame.
#[derive(Debug)]
pub struct HostInput {
    /// Cursor position, each axis in `-1.0..=1.0`, y pointing up.
    pointer: Cell<[f32; 2]>,
    aspect: Cell<f32>,
    device_pixel_ratio: Cell<f64>,
}

impl Default for HostInput {
    fn default() -> Self {
        Self {
            pointer: Cell::new([0.0, 0.0]),
            aspect: Cell::new(16.0 / 9.0),
            device_pixel_ratio: Cell::new(1.0),
        }
    }
}

impl HostInput {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pointer(&self) -> [f32; 2] {
        self.pointer.get()
    }

    pub fn set_pointer(&self, x: f32, y: f32) {
        self.pointer.set([x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)]);
    }

    /// Normalize a cursor position given in CSS pixels.
    pub fn set_pointer_px(&self, x: f64, y: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let nx = (x / width) * 2.0 - 1.0;
        let ny = -((y / height) * 2.0 - 1.0);
        self.set_pointer(nx as f32, ny as f32);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect.get()
    }

    pub fn set_viewport(&self, width: f64, height: f64, device_pixel_ratio: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect.set((width / height) as f32);
        }
        if device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.set(device_pixel_ratio);
        }
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.get()
    }

    /// Visible world extent at the origin plane, `[width, height]`.
    pub fn world_extent(&self) -> [f32; 2] {
        let height = 2.0 * CAMERA_Z * (CAMERA_FOV_DEG.to_radians() / 2.0).tan();
        [height * self.aspect(), height]
    }
}

/// Gentle bob and tilt applied around a primitive, on top of its own motion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatPose {
    /// Vertical offset in world units.
    pub lift: f32,
    /// Euler angles, x y z.
    pub tilt: [f32; 3],
}

impl FloatPose {
    /// Pose after `seconds` of floating with `(speed, rotation_intensity, float_intensity)`.
    pub fn at(seconds: f64, (speed, rotation_intensity, float_intensity): (f32, f32, f32)) -> Self {
        let phase = (seconds / 4.0) as f32 * speed;
        let (sin, cos) = phase.sin_cos();
        Self {
            lift: sin / 10.0 * float_intensity,
            tilt: [
                cos / 8.0 * rotation_intensity,
                sin / 8.0 * rotation_intensity,
                sin / 20.0 * rotation_intensity,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SphereFrame {
    pub radius: f32,
    pub segments: u32,
    pub rotation: [f32; 2],
    pub float: FloatPose,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleFrame {
    pub count: u32,
    pub rotation: [f32; 2],
    /// Flat xyz triples; only present on frames where the field was regenerated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarfieldFrame {
    pub count: u32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsStack {
    pub bloom_intensity: f32,
    pub bloom_threshold: f32,
    pub bloom_smoothing: f32,
    pub chromatic_offset: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
}

impl Default for EffectsStack {
    fn default() -> Self {
        Self {
            bloom_intensity: BLOOM_INTENSITY,
            bloom_threshold: BLOOM_LUMINANCE_THRESHOLD,
            bloom_smoothing: BLOOM_LUMINANCE_SMOOTHING,
            chromatic_offset: CHROMATIC_OFFSET,
            vignette_offset: VIGNETTE_OFFSET,
            vignette_darkness: VIGNETTE_DARKNESS,
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFrame {
    pub tier: QualityTier,
    pub pixel_ratio: f64,
    pub sphere: SphereFrame,
    pub particles: ParticleFrame,
    pub stars: StarfieldFrame,
    /// Floating shapes use plain materials instead of distortion shaders.
    pub plain_materials: bool,
    /// One pose per floating shape, in scene order.
    pub shapes: [FloatPose; 3],
    pub mouse_light: [f32; 2],
    pub environment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectsStack>,
}

/// Builds a [`SceneFrame`] every frame from the latest quality parameters.
pub struct SceneComposer<K, R = StdRng> {
    state: Rc<BackdropState>,
    input: Rc<HostInput>,
    sink: K,
    rng: R,
    last_tier: Option<QualityTier>,
    sphere_rotation: [f32; 2],
    particle_rotation: [f32; 2],
    particle_clock: f64,
    float_clock: f64,
    particle_count: Option<u32>,
    light: [f32; 2],
    sink_failed: bool,
}

impl<K: SceneSink> SceneComposer<K, StdRng> {
    pub fn new(state: Rc<BackdropState>, input: Rc<HostInput>, sink: K) -> Self {
        Self::with_rng(state, input, sink, StdRng::from_os_rng())
    }
}

impl<K: SceneSink, R: Rng> SceneComposer<K, R> {
    pub fn with_rng(state: Rc<BackdropState>, input: Rc<HostInput>, sink: K, rng: R) -> Self {
        Self {
            state,
            input,
            sink,
            rng,
            last_tier: None,
            sphere_rotation: [0.0, 0.0],
            particle_rotation: [0.0, 0.0],
            particle_clock: 0.0,
            float_clock: 0.0,
            particle_count: None,
            light: [0.0, 0.0],
            sink_failed: false,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Advance every primitive by `elapsed` seconds and build the frame.
    pub fn compose(&mut self, elapsed: f64) -> SceneFrame {
        let elapsed = elapsed.max(0.0);
        let quality = self.state.quality();
        if self.last_tier != Some(quality.tier) {
            debug!("scene tier {:?} -> {}", self.last_tier, quality.tier);
            self.last_tier = Some(quality.tier);
        }
        let reduced = quality.reduced_motion();

        let spin = if reduced {
            SPHERE_SPIN_REDUCED
        } else {
            SPHERE_SPIN_NORMAL
        };
        self.sphere_rotation[0] += elapsed as f32 * spin[0];
        self.sphere_rotation[1] += elapsed as f32 * spin[1];

        self.float_clock += elapsed;
        let float_clock = self.float_clock;

        self.advance_particles(elapsed, reduced);
        let positions = self.regenerate_particles(&quality);

        let target = self.pointer_target();
        let blend = quality.light_blend();
        self.light[0] += (target[0] - self.light[0]) * blend;
        self.light[1] += (target[1] - self.light[1]) * blend;

        SceneFrame {
            tier: quality.tier,
            pixel_ratio: quality.pixel_ratio(self.input.device_pixel_ratio()),
            sphere: SphereFrame {
                radius: SPHERE_RADIUS,
                segments: quality.sphere_segments,
                rotation: self.sphere_rotation,
                float: FloatPose::at(float_clock, SPHERE_FLOAT),
            },
            particles: ParticleFrame {
                count: quality.particle_field_count(),
                rotation: self.particle_rotation,
                positions,
            },
            stars: StarfieldFrame {
                count: quality.starfield_count(),
                speed: quality.star_speed(),
            },
            plain_materials: reduced,
            shapes: SHAPE_FLOATS.map(|motion| FloatPose::at(float_clock, motion)),
            mouse_light: self.light,
            environment: quality.environment_enabled(),
            effects: quality.effects_enabled.then(EffectsStack::default),
        }
    }

    // Particles turn in fixed steps at a fixed rate; a long gap yields one step, not a burst.
    fn advance_particles(&mut self, elapsed: f64, reduced: bool) {
        let (tick, step) = if reduced {
            (PARTICLE_TICK_REDUCED_S, PARTICLE_STEP_REDUCED)
        } else {
            (PARTICLE_TICK_NORMAL_S, PARTICLE_STEP_NORMAL)
        };
        self.particle_clock += elapsed;
        if self.particle_clock >= tick {
            self.particle_rotation[0] += step;
            self.particle_rotation[1] += step * PARTICLE_Y_RATIO;
            self.particle_clock = 0.0;
        }
    }

    fn regenerate_particles(&mut self, quality: &QualityParameters) -> Option<Vec<f32>> {
        let count = quality.particle_field_count();
        if self.particle_count == Some(count) {
            return None;
        }
        self.particle_count = Some(count);
        let half = PARTICLE_SPREAD / 2.0;
        let positions: Vec<f32> = (0..count as usize * 3)
            .map(|_| self.rng.random_range(-half..half))
            .collect();
        Some(positions)
    }

    fn pointer_target(&self) -> [f32; 2] {
        let [x, y] = self.input.pointer();
        let [width, height] = self.input.world_extent();
        [x * width / 2.0, y * height / 2.0]
    }
}

impl<K: SceneSink, R: Rng> FrameConsumer for SceneComposer<K, R> {
    fn on_frame(&mut self, elapsed: f64) {
        let frame = self.compose(elapsed);
        match self.sink.draw(&frame) {
            Ok(()) => self.sink_failed = false,
            Err(e) => {
                if !self.sink_failed {
                    warn!("scene frame dropped: {}", e);
                }
                self.sink_failed = true;
            }
        }
    }
}
