/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait

use hd_bridge::hdbridge::{GraphicsDevice, Result, Error};
use hd_bridge::hdbridge::device::{
    DeviceConfig, SurfaceInfo,
    Image, ImageDesc, ImageInfo, ImageFormat, ImageUsage,
    Buffer, BufferDesc, MemoryLocation,
    Shader, ShaderDesc,
    Pipeline, PipelineDesc,
    CommandList,
};
use hd_bridge::hdbridge::delegate::DeviceFactory;
use hd_bridge::{engine_bail, engine_debug, engine_err, engine_error, engine_info, engine_warn};
use ash::vk;
use gpu_allocator::vulkan::{AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use std::ffi::CString;
use std::sync::{Arc, Mutex};

use crate::debug::{ValidationStats, ValidationTracker, vulkan_debug_callback};
use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_command_list::VulkanCommandList;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{
    aspect_mask, buffer_usage_to_vk, debug_severity_flags, image_format_to_vk,
    image_usage_to_vk, memory_location_to_allocator, vk_to_image_format,
};
use crate::vulkan_image::VulkanImage;
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_shader::VulkanShader;

/// Debug messenger plus the tracker its callback writes into
struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
    /// Boxed so the pointer given to the driver stays stable
    tracker: Box<ValidationTracker>,
}

/// Vulkan device implementation
///
/// Central object for creating resources and submitting commands. Created
/// headless; hosts that present through it describe their surface with
/// `set_surface` and wrap their backbuffers with `import_image`.
pub struct VulkanGraphicsDevice {
    /// Vulkan entry (keeps the loader alive)
    _entry: ash::Entry,
    /// Vulkan instance
    instance: ash::Instance,
    /// Physical device
    physical_device: vk::PhysicalDevice,
    /// Fence signalled by the last submit
    submit_fence: vk::Fence,
    /// Validation messenger (if enabled)
    debug: Option<DebugMessenger>,
    /// Host presentation surface, if any
    surface: Option<SurfaceInfo>,
    /// Shared GPU context for all resources
    gpu_context: Arc<GpuContext>,
}

impl VulkanGraphicsDevice {
    /// Create a device with no presentation surface
    ///
    /// Picks the first physical device exposing a graphics queue and enables
    /// Vulkan 1.3 dynamic rendering.
    pub fn new_headless(config: DeviceConfig) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| {
                    engine_error!("hdbridge::vulkan", "Failed to load Vulkan library: {:?}", e);
                    Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
                })?;

            let app_name = CString::new(config.app_name.as_str())
                .map_err(|_| Error::InitializationFailed("Application name contains a NUL byte".to_string()))?;
            let (major, minor, patch) = config.app_version;

            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"HdBridge")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            let enable_validation = config.enable_validation && cfg!(feature = "vulkan-validation");
            if config.enable_validation && !enable_validation {
                engine_warn!("hdbridge::vulkan",
                    "Validation requested but the vulkan-validation feature is disabled");
            }

            let mut extension_names = Vec::new();
            let mut layer_names = Vec::new();
            if enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                layer_names.push(c"VK_LAYER_KHRONOS_validation".as_ptr());
            }

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| {
                    engine_error!("hdbridge::vulkan", "Failed to create Vulkan instance: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
                })?;

            // From here on, failures must destroy what was created
            let debug = if enable_validation {
                match Self::create_debug_messenger(&entry, &instance, &config) {
                    Ok(debug) => Some(debug),
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                None
            };

            match Self::create_device(&instance) {
                Ok((physical_device, gpu_context, submit_fence)) => {
                    engine_info!("hdbridge::vulkan", "Headless Vulkan device created (validation: {})",
                        enable_validation);
                    Ok(Self {
                        _entry: entry,
                        instance,
                        physical_device,
                        submit_fence,
                        debug,
                        surface: None,
                        gpu_context,
                    })
                }
                Err(e) => {
                    if let Some(debug) = debug {
                        debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
                    }
                    instance.destroy_instance(None);
                    Err(e)
                }
            }
        }
    }

    unsafe fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
        config: &DeviceConfig,
    ) -> Result<DebugMessenger> {
        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let tracker = Box::new(ValidationTracker::new());

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(debug_severity_flags(config.debug_severity))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
            )
            .pfn_user_callback(Some(vulkan_debug_callback))
            .user_data(tracker.as_ref() as *const ValidationTracker as *mut std::ffi::c_void);

        let messenger = loader
            .create_debug_utils_messenger(&debug_info, None)
            .map_err(|e| {
                engine_error!("hdbridge::vulkan", "Failed to create debug messenger: {:?}", e);
                Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
            })?;

        Ok(DebugMessenger { loader, messenger, tracker })
    }

    unsafe fn create_device(
        instance: &ash::Instance,
    ) -> Result<(vk::PhysicalDevice, Arc<GpuContext>, vk::Fence)> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| {
                engine_error!("hdbridge::vulkan", "Failed to enumerate physical devices: {:?}", e);
                Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
            })?;

        // First device with a graphics queue family
        let (physical_device, graphics_family_index) = physical_devices
            .into_iter()
            .find_map(|pd| {
                instance
                    .get_physical_device_queue_family_properties(pd)
                    .iter()
                    .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|index| (pd, index as u32))
            })
            .ok_or_else(|| {
                engine_error!("hdbridge::vulkan", "No Vulkan-capable GPU with a graphics queue found");
                Error::InitializationFailed("No Vulkan-capable GPU found".to_string())
            })?;

        let properties = instance.get_physical_device_properties(physical_device);
        if let Ok(name) = properties.device_name_as_c_str() {
            engine_debug!("hdbridge::vulkan", "Using GPU {:?}", name);
        }

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(graphics_family_index)
            .queue_priorities(&queue_priorities)];

        let mut vulkan13_features = vk::PhysicalDeviceVulkan13Features::default()
            .dynamic_rendering(true);

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .push_next(&mut vulkan13_features);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| {
                engine_error!("hdbridge::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?;

        let graphics_queue = device.get_device_queue(graphics_family_index, 0);

        let allocator = match Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        }) {
            Ok(allocator) => allocator,
            Err(e) => {
                device.destroy_device(None);
                engine_error!("hdbridge::vulkan", "Failed to create GPU allocator: {:?}", e);
                return Err(Error::InitializationFailed(format!("Failed to create allocator: {:?}", e)));
            }
        };

        // Signalled so the first submit does not wait
        let fence_create_info = vk::FenceCreateInfo::default()
            .flags(vk::FenceCreateFlags::SIGNALED);
        let submit_fence = match device.create_fence(&fence_create_info, None) {
            Ok(fence) => fence,
            Err(e) => {
                drop(allocator);
                device.destroy_device(None);
                engine_error!("hdbridge::vulkan", "Failed to create submit fence: {:?}", e);
                return Err(Error::InitializationFailed(format!("Failed to create fence: {:?}", e)));
            }
        };

        let gpu_context = Arc::new(GpuContext::new(
            device,
            allocator,
            graphics_queue,
            graphics_family_index,
            properties.limits.non_coherent_atom_size,
        ));

        Ok((physical_device, gpu_context, submit_fence))
    }

    /// Describe (or clear) the host surface render passes present into
    pub fn set_surface(&mut self, surface: Option<SurfaceInfo>) {
        self.surface = surface;
    }

    /// Wrap a host image without taking ownership
    ///
    /// The host keeps the image and view alive for as long as the returned
    /// handle is in use; dropping the handle destroys nothing.
    pub fn import_image(
        &self,
        image: vk::Image,
        view: vk::ImageView,
        width: u32,
        height: u32,
        format: vk::Format,
    ) -> Result<Arc<dyn Image>> {
        let format = vk_to_image_format(format).ok_or_else(|| {
            Error::UnsupportedType(format!("Cannot import image with format {:?}", format))
        })?;

        let usage = if format.is_depth() {
            ImageUsage::DEPTH_ATTACHMENT | ImageUsage::TRANSFER_DST
        } else {
            ImageUsage::COLOR_ATTACHMENT | ImageUsage::TRANSFER_DST
        };

        Ok(Arc::new(VulkanImage::imported(
            Arc::clone(&self.gpu_context),
            image,
            view,
            ImageInfo { width, height, format, usage },
        )))
    }

    /// Logical device, for hosts that record their own Vulkan work
    pub fn raw_device(&self) -> &ash::Device {
        &self.gpu_context.device
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn graphics_queue_family(&self) -> u32 {
        self.gpu_context.graphics_queue_family
    }

    /// Validation message counters (all zero without validation)
    pub fn validation_stats(&self) -> ValidationStats {
        self.debug
            .as_ref()
            .map(|debug| debug.tracker.stats())
            .unwrap_or_default()
    }

    fn image_view_info(format: ImageFormat) -> vk::ImageViewCreateInfo<'static> {
        vk::ImageViewCreateInfo::default()
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(image_format_to_vk(format))
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_mask(format),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            })
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn backend_name(&self) -> &'static str {
        "vulkan"
    }

    fn create_image(&mut self, desc: ImageDesc) -> Result<Arc<dyn Image>> {
        if desc.width == 0 || desc.height == 0 {
            return Err(Error::InvalidResource(format!(
                "Image '{}' has a zero extent ({}x{})",
                desc.label, desc.width, desc.height
            )));
        }

        let device = &self.gpu_context.device;

        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(image_format_to_vk(desc.format))
                .extent(vk::Extent3D { width: desc.width, height: desc.height, depth: 1 })
                .mip_levels(1)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(image_usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = device.create_image(&image_create_info, None)
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to create image '{}': {:?}", desc.label, e))?;

            let requirements = device.get_image_memory_requirements(image);

            let allocation = self.gpu_context.with_allocator(|allocator| {
                allocator
                    .allocate(&AllocationCreateDesc {
                        name: &desc.label,
                        requirements,
                        location: gpu_allocator::MemoryLocation::GpuOnly,
                        linear: false,
                        allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                    })
                    .map_err(|_| {
                        let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                        engine_error!("hdbridge::vulkan", "Out of GPU memory for image '{}' (required: {:.2} MB)",
                            desc.label, size_mb);
                        Error::OutOfMemory
                    })
            });
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    device.destroy_image(image, None);
                    return Err(e);
                }
            };

            if let Err(e) = device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
                self.gpu_context.free(allocation);
                device.destroy_image(image, None);
                engine_bail!("hdbridge::vulkan", "Failed to bind image memory: {:?}", e);
            }

            let view_create_info = Self::image_view_info(desc.format).image(image);
            let view = match device.create_image_view(&view_create_info, None) {
                Ok(view) => view,
                Err(e) => {
                    self.gpu_context.free(allocation);
                    device.destroy_image(image, None);
                    engine_bail!("hdbridge::vulkan", "Failed to create image view: {:?}", e);
                }
            };

            engine_debug!("hdbridge::vulkan", "Created image '{}' {}x{} {:?}",
                desc.label, desc.width, desc.height, desc.format);

            Ok(Arc::new(VulkanImage::owned(
                Arc::clone(&self.gpu_context),
                image,
                view,
                allocation,
                ImageInfo {
                    width: desc.width,
                    height: desc.height,
                    format: desc.format,
                    usage: desc.usage,
                },
            )))
        }
    }

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if desc.size == 0 {
            return Err(Error::InvalidResource(format!("Buffer '{}' has zero size", desc.label)));
        }

        let device = &self.gpu_context.device;

        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size)
                .usage(buffer_usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = device.create_buffer(&buffer_create_info, None)
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to create buffer of size {} bytes: {:?}", desc.size, e))?;

            let requirements = device.get_buffer_memory_requirements(buffer);

            let allocation = self.gpu_context.with_allocator(|allocator| {
                allocator
                    .allocate(&AllocationCreateDesc {
                        name: &desc.label,
                        requirements,
                        location: memory_location_to_allocator(desc.location),
                        linear: true,
                        allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                    })
                    .map_err(|_| {
                        let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                        engine_error!("hdbridge::vulkan", "Out of GPU memory for buffer '{}' (required: {:.2} MB)",
                            desc.label, size_mb);
                        Error::OutOfMemory
                    })
            });
            let allocation = match allocation {
                Ok(allocation) => allocation,
                Err(e) => {
                    device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            if let Err(e) = device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                self.gpu_context.free(allocation);
                device.destroy_buffer(buffer, None);
                engine_bail!("hdbridge::vulkan", "Failed to bind buffer memory: {:?}", e);
            }

            if desc.location != MemoryLocation::GpuOnly && allocation.mapped_ptr().is_none() {
                engine_warn!("hdbridge::vulkan", "Host-visible buffer '{}' is not mapped", desc.label);
            }

            Ok(Arc::new(VulkanBuffer::new(
                Arc::clone(&self.gpu_context),
                buffer,
                allocation,
                desc.size,
            )))
        }
    }

    fn create_shader(&mut self, desc: ShaderDesc) -> Result<Arc<dyn Shader>> {
        Ok(Arc::new(VulkanShader::new(&self.gpu_context.device, &desc)?))
    }

    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        Ok(Arc::new(VulkanPipeline::new(&self.gpu_context.device, &desc)?))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(VulkanCommandList::new(Arc::clone(&self.gpu_context))?))
    }

    fn submit(&self, command_lists: &[&dyn CommandList]) -> Result<()> {
        let device = &self.gpu_context.device;

        unsafe {
            // Collect command buffers
            let mut command_buffers = Vec::with_capacity(command_lists.len());
            for cmd in command_lists {
                let vk_cmd = VulkanCommandList::from_dyn(*cmd);
                if vk_cmd.is_recording() {
                    engine_bail!("hdbridge::vulkan", "submit: command list is still recording");
                }
                command_buffers.push(vk_cmd.command_buffer());
            }

            // Wait for previous submit with this fence
            device
                .wait_for_fences(&[self.submit_fence], true, u64::MAX)
                .map_err(|e| engine_err!("hdbridge::vulkan", "submit: failed to wait for fence: {:?}", e))?;

            device
                .reset_fences(&[self.submit_fence])
                .map_err(|e| engine_err!("hdbridge::vulkan", "submit: failed to reset fence: {:?}", e))?;

            let submit_info = vk::SubmitInfo::default()
                .command_buffers(&command_buffers);

            device
                .queue_submit(self.gpu_context.graphics_queue, &[submit_info], self.submit_fence)
                .map_err(|e| engine_err!("hdbridge::vulkan", "submit: failed to submit queue: {:?}", e))?;

            Ok(())
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.gpu_context
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!("hdbridge::vulkan", "Failed to wait idle: {:?}", e))
        }
    }

    fn surface(&self) -> Option<SurfaceInfo> {
        self.surface
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            let device = &self.gpu_context.device;

            // Wait for device to finish
            device.device_wait_idle().ok();

            device.destroy_fence(self.submit_fence, None);

            // Free VkDeviceMemory pages BEFORE destroying the device
            if Arc::strong_count(&self.gpu_context) > 1 {
                engine_warn!("hdbridge::vulkan", "{} GPU resource(s) outlive the device",
                    Arc::strong_count(&self.gpu_context) - 1);
            }
            self.gpu_context.shutdown_allocator();

            // Destroy debug messenger BEFORE device and instance
            if let Some(debug) = self.debug.take() {
                debug.loader.destroy_debug_utils_messenger(debug.messenger, None);
            }

            device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

// ============================================================================
// Device factory
// ============================================================================

/// Creates the engine-owned Vulkan device when the host provides none
pub struct VulkanDeviceFactory {
    config: DeviceConfig,
}

impl VulkanDeviceFactory {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }
}

impl Default for VulkanDeviceFactory {
    fn default() -> Self {
        Self::new(DeviceConfig::default())
    }
}

impl DeviceFactory for VulkanDeviceFactory {
    fn backend_name(&self) -> &'static str {
        "vulkan"
    }

    fn create_headless(&self) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let device = VulkanGraphicsDevice::new_headless(self.config.clone())?;
        Ok(Arc::new(Mutex::new(device)))
    }
}
