//! Application-level configuration constants.

// Low-performance classification thresholds
pub const LOW_PERF_MAX_WIDTH_PX: f64 = 900.0;
pub const LOW_PERF_MAX_CORES: u32 = 4;
pub const LOW_PERF_MIN_DPR: f64 = 1.5;
pub const LOW_PERF_MIN_MEMORY_GB: f64 = 4.0;

// Fallbacks for signals the host does not report. Each one classifies as not-low.
pub const DEFAULT_VIEWPORT_WIDTH_PX: f64 = 1280.0;
pub const DEFAULT_CORE_COUNT: u32 = 8;
pub const DEFAULT_DEVICE_PIXEL_RATIO: f64 = 1.0;
pub const DEFAULT_DEVICE_MEMORY_GB: f64 = 4.0;

// Debounce windows (milliseconds)
pub const RESIZE_DEBOUNCE_MS: u32 = 100;
pub const SCROLL_IDLE_MS: u32 = 150;

// Scroll attenuation applied to the starfield and particle field
pub const SCROLL_DENSITY_SCALE: f64 = 0.25;
pub const SCROLL_MIN_STARS: u32 = 200;

// Starfield drift speed per tier
pub const STAR_SPEED_NORMAL: f32 = 1.0;
pub const STAR_SPEED_LOW: f32 = 0.3;
pub const STAR_SPEED_SCROLLING: f32 = 0.2;

// Mouse light blend factor per frame
pub const LIGHT_BLEND_NORMAL: f32 = 0.12;
pub const LIGHT_BLEND_REDUCED: f32 = 0.05;

// Wireframe sphere rotation (radians per second, x then y)
pub const SPHERE_SPIN_NORMAL: [f32; 2] = [0.06, 0.08];
pub const SPHERE_SPIN_REDUCED: [f32; 2] = [0.02, 0.03];
pub const SPHERE_RADIUS: f32 = 2.0;

// Particle field ticks at a fixed rate; each tick rotates by a fixed step
pub const PARTICLE_TICK_NORMAL_S: f64 = 1.0 / 30.0;
pub const PARTICLE_TICK_REDUCED_S: f64 = 1.0 / 15.0;
pub const PARTICLE_STEP_NORMAL: f32 = 0.02;
pub const PARTICLE_STEP_REDUCED: f32 = 0.005;
pub const PARTICLE_Y_RATIO: f32 = 1.5;
pub const PARTICLE_SPREAD: f32 = 20.0;

// Floating bob and tilt as (speed, rotation intensity, float intensity)
pub const SPHERE_FLOAT: (f32, f32, f32) = (0.6, 0.3, 0.6);
pub const SHAPE_FLOATS: [(f32, f32, f32); 3] = [(1.5, 2.0, 1.0), (2.0, 1.0, 2.0), (1.8, 3.0, 1.5)];

// Camera, used to project the normalized pointer into world space
pub const CAMERA_Z: f32 = 5.0;
pub const CAMERA_FOV_DEG: f32 = 75.0;

// Renderer pixel-ratio cap
pub const MAX_PIXEL_RATIO: f64 = 1.5;
pub const SCROLLING_PIXEL_RATIO: f64 = 1.0;

// Post-processing stack
pub const BLOOM_INTENSITY: f32 = 0.45;
pub const BLOOM_LUMINANCE_THRESHOLD: f32 = 0.95;
pub const BLOOM_LUMINANCE_SMOOTHING: f32 = 0.03;
pub const CHROMATIC_OFFSET: f32 = 0.001;
pub const VIGNETTE_OFFSET: f32 = 0.1;
pub const VIGNETTE_DARKNESS: f32 = 0.45;

// Frame-rate monitor
pub const FPS_SAMPLE_WINDOW_MS: f64 = 1000.0;

// DOM
pub const CANVAS_ID: &str = "backdrop-canvas";
