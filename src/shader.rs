//! Point shader source, its uniform layout, and WGSL validation.
//!
//! Validation runs naga over the source before wgpu sees it, so a broken
//! shader is reported with a readable message instead of a device panic.

use crate::error::ShaderError;
use bytemuck::{Pod, Zeroable};
use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

pub const POINT_SHADER: &str = include_str!("tornado.wgsl");

/// Matches `Uniforms` in `tornado.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    /// Canvas size in pixels.
    pub viewport: [f32; 2],
    /// Point diameter in pixels.
    pub point_size: f32,
    pub _padding: f32,
}

/// Parse and validate WGSL source.
pub fn validate(source: &str, stage: &'static str) -> Result<(), ShaderError> {
    let module = wgsl::parse_str(source).map_err(|err| ShaderError::Compile {
        stage,
        message: err.emit_to_string(source),
    })?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| ShaderError::Compile {
            stage,
            message: err.to_string(),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_shader_is_valid() {
        validate(POINT_SHADER, "Point").unwrap();
    }

    #[test]
    fn test_point_shader_entry_points() {
        assert!(POINT_SHADER.contains("fn vs_main"));
        assert!(POINT_SHADER.contains("fn fs_main"));
        assert!(POINT_SHADER.contains("vec4<f32>(0.6, 0.6, 0.4, 1.0)"));
    }

    #[test]
    fn test_syntax_error_is_compile_error() {
        let err = validate("fn broken( {", "Point").unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: "Point", .. }));
    }

    #[test]
    fn test_type_error_is_compile_error() {
        let src = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec3<f32>(1.0, 0.0, 0.0);
}
"#;
        assert!(validate(src, "Fragment").is_err());
    }

    #[test]
    fn test_uniform_size_matches_wgsl() {
        // two mat4x4 (128) + vec2 (8) + f32 + f32
        assert_eq!(std::mem::size_of::<Uniforms>(), 144);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
