use crate::gpu::texture::DEPTH_FORMAT;

/// Opaque color target for the surface format.
pub fn color_target(format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    }
}

/// Depth-stencil state for window quads. With testing disabled the depth
/// attachment is still bound but every fragment passes, so later windows
/// paint over earlier ones.
pub fn depth_stencil_state(depth_test: bool) -> wgpu::DepthStencilState {
    let (depth_write_enabled, depth_compare) = if depth_test {
        (true, wgpu::CompareFunction::Less)
    } else {
        (false, wgpu::CompareFunction::Always)
    };
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_toggles_compare() {
        assert_eq!(
            depth_stencil_state(true).depth_compare,
            wgpu::CompareFunction::Less
        );
        let off = depth_stencil_state(false);
        assert_eq!(off.depth_compare, wgpu::CompareFunction::Always);
        assert!(!off.depth_write_enabled);
    }
}
