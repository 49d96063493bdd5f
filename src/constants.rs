/// Scene tuning constants.
///
/// These constants express intended behavior (e.g., multipliers, clamp
/// limits, palette) and keep magic numbers out of the code. Lifecycle
/// thresholds that deployments may want to tune live in `core::SceneConfig`.
// Rotation multipliers per tier / activity level
pub const FULL_ROTATION_MULTIPLIER: f32 = 1.0;
pub const REDUCED_ROTATION_MULTIPLIER: f32 = 0.5;
pub const DORMANT_ROTATION_MULTIPLIER: f32 = 0.25;

// Backing-store resolution relative to the device pixel ratio
pub const FULL_RESOLUTION_SCALE: f32 = 1.0;
pub const REDUCED_RESOLUTION_SCALE: f32 = 0.7;
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// Frames arriving later than this are stepped forward by this amount only
pub const MAX_FRAME_DELTA_SEC: f32 = 0.1;

// Parallax camera
pub const CAMERA_Z: f32 = 5.0;
pub const PARALLAX_INTERVAL_SEC: f32 = 0.1;
pub const PARALLAX_MAX_OFFSET: f32 = 0.5;
pub const PARALLAX_LERP: f32 = 0.05;

// Reduced tier refreshes scroll styling at most this often (seconds)
pub const REDUCED_STYLE_INTERVAL_SEC: f32 = 0.1;

// Scroll-driven styling
pub const BASE_ROTATION_SPEED: f32 = 0.1;
pub const ROTATION_SPEED_PER_PERCENT: f32 = 0.001;
pub const SCROLL_SCALE_GAIN: f32 = 0.3;
pub const START_COLOR: [f32; 3] = [0x80 as f32 / 255.0, 0x28 as f32 / 255.0, 1.0]; // #8028ff
pub const END_COLOR: [f32; 3] = [1.0, 0xa4 as f32 / 255.0, 0.0]; // #ffa400

// Mesh + material
pub const ICOSAHEDRON_RADIUS: f32 = 1.5;
pub const EMISSIVE_COLOR: [f32; 3] = [
    0x5d as f32 / 255.0,
    0xe0 as f32 / 255.0,
    0xe6 as f32 / 255.0,
]; // #5de0e6
pub const EMISSIVE_INTENSITY: f32 = 0.5;
pub const METALNESS: f32 = 0.7;
pub const ROUGHNESS: f32 = 0.2;

// Lighting
pub const AMBIENT_INTENSITY: f32 = 0.3;
pub const LIGHT_POSITION: [f32; 3] = [5.0, 5.0, 5.0];
pub const LIGHT_INTENSITY: f32 = 1.0;

// Post-processing defaults
pub const BLOOM_STRENGTH: f32 = 0.6;
pub const BLOOM_THRESHOLD: f32 = 0.0;
pub const MSAA_SAMPLES: u32 = 4;
