/// Per-frame uniform storage: every draw's snapshot lives at its own
/// aligned offset of one buffer, selected with a dynamic offset.
pub(super) struct UniformArena {
    buffer: wgpu::Buffer,
    capacity: u64,
    alignment: u64,
    staging: Vec<u8>,
    /// Bumped whenever `buffer` is replaced; bind groups built on an older
    /// generation must be rebuilt.
    generation: u64,
}

const INITIAL_CAPACITY: u64 = 16 * 1024;

impl UniformArena {
    pub fn new(device: &wgpu::Device, alignment: u32) -> Self {
        Self {
            buffer: create_buffer(device, INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            alignment: u64::from(alignment.max(1)),
            staging: Vec::new(),
            generation: 0,
        }
    }

    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clear(&mut self) {
        self.staging.clear();
    }

    /// Appends a snapshot and returns its dynamic offset.
    ///
    /// `min_size` pads the entry so a binding of that size starting at the
    /// offset stays inside the buffer.
    pub fn push(&mut self, bytes: &[u8], min_size: u64) -> u32 {
        let offset = (self.staging.len() as u64).next_multiple_of(self.alignment);
        let end = offset + (bytes.len() as u64).max(min_size);
        self.staging.resize(end as usize, 0);
        self.staging[offset as usize..offset as usize + bytes.len()].copy_from_slice(bytes);
        offset as u32
    }

    /// Uploads the staged snapshots, growing the buffer if needed.
    pub fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.staging.is_empty() {
            return;
        }

        let needed = self.staging.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("uniform arena grows {} -> {capacity} bytes", self.capacity);
            self.buffer = create_buffer(device, capacity);
            self.capacity = capacity;
            self.generation += 1;
        }

        // write_buffer needs a multiple of 4 bytes.
        let len = self.staging.len().next_multiple_of(4);
        self.staging.resize(len, 0);
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }
}

fn create_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("iris uniform arena"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
