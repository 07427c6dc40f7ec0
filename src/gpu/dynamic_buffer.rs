//! Growable GPU buffers.
//!
//! [`DynamicBuffer`] reallocates with 2x growth when a write exceeds its
//! capacity. [`SlotPacker`] lays out one uniform block per draw at the
//! device's dynamic-offset alignment so a frame's draws share one buffer.

/// A GPU buffer that grows on demand and never shrinks.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: usize,
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity (at least 256).
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = initial_capacity.max(256);
        Self {
            buffer: Self::allocate(device, label, capacity, usage),
            capacity,
            len: 0,
            usage,
            label: label.to_owned(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Write raw bytes from offset 0, growing if necessary.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups that
    /// reference it must be recreated).
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = data.len();
        let reallocated = needed > self.capacity;
        if reallocated {
            let capacity = (needed * 2).max(self.capacity + 1024);
            log::debug!(
                "{}: growing {} -> {capacity} bytes",
                self.label,
                self.capacity
            );
            self.buffer =
                Self::allocate(device, &self.label, capacity, self.usage);
            self.capacity = capacity;
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }
        self.len = needed;
        reallocated
    }

    /// The current GPU buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bytes written by the last write.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the last write was empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Packs fixed-size blocks into a byte vector at a fixed stride.
#[derive(Debug, Clone)]
pub struct SlotPacker {
    stride: usize,
    bytes: Vec<u8>,
}

impl SlotPacker {
    /// Packer for blocks of `block_size` bytes, each starting on a multiple
    /// of `alignment` (a power of two, e.g.
    /// `min_uniform_buffer_offset_alignment`).
    #[must_use]
    pub fn new(block_size: usize, alignment: u32) -> Self {
        let align = (alignment as usize).max(1);
        Self {
            stride: block_size.div_ceil(align) * align,
            bytes: Vec::new(),
        }
    }

    /// Distance between consecutive blocks.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Forget all blocks, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append one block, returning its dynamic offset.
    pub fn push<T: bytemuck::Pod>(&mut self, block: &T) -> u32 {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(bytemuck::bytes_of(block));
        self.bytes.resize(offset + self.stride, 0);
        offset as u32
    }

    /// Number of blocks pushed since the last clear.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() / self.stride
    }

    /// Whether no block has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The packed bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_land_on_aligned_offsets() {
        let mut packer = SlotPacker::new(96, 256);
        assert_eq!(packer.stride(), 256);
        assert_eq!(packer.push(&[1.0_f32; 24]), 0);
        assert_eq!(packer.push(&[2.0_f32; 24]), 256);
        assert_eq!(packer.len(), 2);
        assert_eq!(packer.bytes().len(), 512);
        // padding after the first block is zeroed
        assert!(packer.bytes()[96..256].iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_restarts_offsets() {
        let mut packer = SlotPacker::new(320, 256);
        assert_eq!(packer.stride(), 512);
        let _ = packer.push(&[0.0_f32; 64]);
        packer.clear();
        assert!(packer.is_empty());
        assert_eq!(packer.push(&[0.0_f32; 64]), 0);
    }
}
