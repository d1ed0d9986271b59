/// Fixed graphics pipeline: no vertex input, depth tested, dynamic viewport and scissor

use ash::vk;
use lumen_engine::lumen::config::ShaderPaths;
use lumen_engine::lumen::{Error, Result};
use lumen_engine::{engine_error, engine_info};

use crate::vulkan_shader::VulkanShader;

pub(crate) struct VulkanPipeline {
    pub(crate) layout: vk::PipelineLayout,
    pub(crate) pipeline: vk::Pipeline,
}

impl VulkanPipeline {
    /// Build the pipeline for `render_pass` from the configured shaders
    ///
    /// Shader modules only live for the duration of the call.
    pub(crate) fn new(
        device: &ash::Device,
        render_pass: vk::RenderPass,
        shaders: &ShaderPaths,
        samples: vk::SampleCountFlags,
    ) -> Result<Self> {
        let vertex = VulkanShader::load(
            device,
            &shaders.vertex_path(),
            vk::ShaderStageFlags::VERTEX,
            &shaders.entry_point,
        )?;
        let fragment = match VulkanShader::load(
            device,
            &shaders.fragment_path(),
            vk::ShaderStageFlags::FRAGMENT,
            &shaders.entry_point,
        ) {
            Ok(fragment) => fragment,
            Err(e) => {
                vertex.destroy(device);
                return Err(e);
            }
        };

        let result = Self::build(device, render_pass, samples, &vertex, &fragment);
        vertex.destroy(device);
        fragment.destroy(device);

        if result.is_ok() {
            engine_info!("lumen::vulkan", "Graphics pipeline created from '{}' shaders", shaders.name);
        }
        result
    }

    fn build(
        device: &ash::Device,
        render_pass: vk::RenderPass,
        samples: vk::SampleCountFlags,
        vertex: &VulkanShader,
        fragment: &VulkanShader,
    ) -> Result<Self> {
        let stages = [vertex.stage_info(), fragment.stage_info()];

        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Actual rectangles are set per frame
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(samples)
            .sample_shading_enable(false);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(true)
            .depth_write_enable(true)
            .depth_compare_op(vk::CompareOp::LESS)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(true)
            .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
            .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
            .color_blend_op(vk::BlendOp::ADD)
            .src_alpha_blend_factor(vk::BlendFactor::ONE)
            .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
            .alpha_blend_op(vk::BlendOp::ADD)];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let layout_info = vk::PipelineLayoutCreateInfo::default();
        let layout = unsafe { device.create_pipeline_layout(&layout_info, None) }.map_err(|e| {
            engine_error!("lumen::vulkan", "Failed to create pipeline layout: {:?}", e);
            Error::PipelineCreation(format!("Failed to create pipeline layout: {:?}", e))
        })?;

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blending)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipelines = unsafe {
            device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
        };
        match pipelines {
            Ok(pipelines) => Ok(Self {
                layout,
                pipeline: pipelines[0],
            }),
            Err((_, e)) => {
                unsafe { device.destroy_pipeline_layout(layout, None) };
                engine_error!("lumen::vulkan", "Failed to create graphics pipeline: {:?}", e);
                Err(Error::PipelineCreation(format!("Failed to create graphics pipeline: {:?}", e)))
            }
        }
    }

    pub(crate) fn destroy(&self, device: &ash::Device) {
        unsafe {
            device.destroy_pipeline(self.pipeline, None);
            device.destroy_pipeline_layout(self.layout, None);
        }
    }
}
