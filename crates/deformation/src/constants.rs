/// Quantization scale used when welding positionally identical vertices.
pub const WELD_SCALE: f32 = 1_000_000.0;

/// Epsilon for floating point comparisons in ray intersection.
pub const RAY_EPSILON: f32 = 1e-6;
