use std::mem;

use fxhash::FxHashMap;
use log::warn;

use crate::{gpu, MappedStorageBuffer, Params};

/// Upper bound on dynamic lights; the buffer is allocated up front so that
/// bind groups stay valid for a volume's whole lifetime.
pub const MAX_LIGHTS: usize = 256;

#[derive(Debug)]
pub struct Lights<P>
where
    P: Params,
{
    buffer: MappedStorageBuffer<Vec<gpu::Light>>,
    index: FxHashMap<P::LightHandle, gpu::LightId>,
}

impl<P> Lights<P>
where
    P: Params,
{
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = MappedStorageBuffer::new(
            device,
            "prtgi_lights",
            MAX_LIGHTS * mem::size_of::<gpu::Light>(),
            Vec::new(),
        );

        Self {
            buffer,
            index: Default::default(),
        }
    }

    pub fn add(&mut self, light_handle: P::LightHandle, light: gpu::Light) {
        if let Some(light_id) = self.index.get(&light_handle) {
            self.buffer[light_id.get() as usize] = light;
            return;
        }

        if self.buffer.len() >= MAX_LIGHTS {
            warn!("Too many lights, ignoring: {light_handle:?}");
            return;
        }

        let light_id = gpu::LightId::new(self.buffer.len() as u32);

        self.buffer.push(light);
        self.index.insert(light_handle, light_id);
    }

    pub fn remove(&mut self, light_handle: &P::LightHandle) {
        let Some(light_id) = self.index.remove(light_handle) else {
            return;
        };

        self.buffer.remove(light_id.get() as usize);

        for light_id2 in self.index.values_mut() {
            if light_id2.get() > light_id.get() {
                *light_id2 = gpu::LightId::new(light_id2.get() - 1);
            }
        }
    }

    pub fn len(&self) -> u32 {
        self.buffer.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.buffer.flush(queue);
    }

    pub fn as_binding(&self) -> wgpu::BindingResource {
        self.buffer.as_binding()
    }
}
