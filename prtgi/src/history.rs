use log::warn;

use crate::{gpu, VoxelTexture};

/// Role tags of the ring's physical textures at one instant.
///
/// `history` only carries meaning in the three-buffer (multi-frame)
/// configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RingRoles {
    pub write: usize,
    pub current: usize,
    pub history: usize,
}

impl RingRoles {
    pub fn initial() -> Self {
        Self {
            write: 0,
            current: 1,
            history: 2,
        }
    }

    /// One rotation step: two-buffer rings swap Write and Current;
    /// three-buffer rings rotate Write→Current, Current→History,
    /// History→Write.
    pub fn advanced(self, period: usize) -> Self {
        if period == 2 {
            Self {
                write: self.current,
                current: self.write,
                history: self.history,
            }
        } else {
            Self {
                write: self.history,
                current: self.write,
                history: self.current,
            }
        }
    }

    pub fn at_phase(phase: usize, period: usize) -> Self {
        (0..phase).fold(Self::initial(), |roles, _| roles.advanced(period))
    }
}

/// Ring of SH voxel textures rotated once per relight frame, so that probes
/// always write into a texture nobody is reading this frame while the
/// previous frames' results stay readable for compositing and for the
/// infinite-bounce feedback.
#[derive(Debug)]
pub struct HistoryBuffers {
    textures: Vec<VoxelTexture>,
    multi_frame: bool,
    frames: u32,
}

impl HistoryBuffers {
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            multi_frame: false,
            frames: 0,
        }
    }

    /// Releases the previous ring (as a unit) and allocates a fresh one sized
    /// for `grid`: two textures, or three when `multi_frame` relighting needs
    /// a history frame.
    pub fn initialize(
        &mut self,
        device: &wgpu::Device,
        grid: gpu::Grid,
        multi_frame: bool,
    ) {
        self.release();

        self.multi_frame = multi_frame;
        self.frames = 0;

        let period = self.period();

        for i in 0..period {
            self.textures.push(VoxelTexture::new(
                device,
                format!("prtgi_voxel_{i}"),
                grid.voxel_extent(),
            ));
        }
    }

    pub fn release(&mut self) {
        self.textures.clear();
        self.frames = 0;
    }

    pub fn is_initialized(&self) -> bool {
        !self.textures.is_empty()
    }

    pub fn period(&self) -> usize {
        if self.multi_frame {
            3
        } else {
            2
        }
    }

    /// Rotates the ring; call exactly once per relight frame, before the
    /// write texture is cleared or written.
    pub fn advance(&mut self) {
        if !self.is_initialized() {
            warn!("History buffers not initialized, cannot rotate");
            return;
        }

        self.frames += 1;
    }

    /// Which rotation phase the ring is in; selects the per-phase bind
    /// groups.
    pub fn phase(&self) -> usize {
        (self.frames as usize) % self.period()
    }

    /// The ring is warmed up once every texture has been written to, i.e.
    /// after one full rotation cycle.
    pub fn is_warmed_up(&self) -> bool {
        self.frames > self.period() as u32
    }

    /// Whether this frame's write texture must be cleared first: always,
    /// except that multi-frame relighting past warm-up retains prior content
    /// for the probes not updated this frame.
    pub fn should_clear_write(&self) -> bool {
        !self.multi_frame || !self.is_warmed_up()
    }

    pub fn write_view_at(&self, phase: usize) -> Option<&wgpu::TextureView> {
        let roles = RingRoles::at_phase(phase, self.period());

        Some(self.textures.get(roles.write)?.view())
    }

    /// Texture the relight kernel reads last frame's bounce light from.
    pub fn feedback_view_at(
        &self,
        phase: usize,
    ) -> Option<&wgpu::TextureView> {
        let roles = RingRoles::at_phase(phase, self.period());

        let index = if self.multi_frame {
            roles.history
        } else {
            roles.current
        };

        Some(self.textures.get(index)?.view())
    }

    /// Texture the composite pass should sample this frame.
    pub fn output_view(&self) -> Option<&wgpu::TextureView> {
        let roles = RingRoles::at_phase(self.phase(), self.period());

        let index = if self.multi_frame {
            roles.current
        } else {
            roles.write
        };

        Some(self.textures.get(index)?.view())
    }
}

impl Default for HistoryBuffers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_is_a_full_cycle() {
        for period in [2, 3] {
            let mut roles = RingRoles::initial();

            for step in 1..=period {
                roles = roles.advanced(period);

                if step < period {
                    assert_ne!(RingRoles::initial(), roles);
                }
            }

            assert_eq!(RingRoles::initial(), roles);
        }
    }

    #[test]
    fn triple_rotation_moves_write_to_current() {
        let roles = RingRoles::initial().advanced(3);

        // What was just written must become readable ...
        assert_eq!(0, roles.current);

        // ... the old current ages into history ...
        assert_eq!(1, roles.history);

        // ... and the oldest texture takes the writes
        assert_eq!(2, roles.write);
    }

    #[test]
    fn double_rotation_swaps_write_and_current() {
        let roles = RingRoles::initial().advanced(2);

        assert_eq!(1, roles.write);
        assert_eq!(0, roles.current);

        let roles = roles.advanced(2);

        assert_eq!(RingRoles::initial(), roles);
    }

    #[test]
    fn phases_visit_every_role_assignment() {
        for period in [2, 3] {
            assert_eq!(RingRoles::initial(), RingRoles::at_phase(0, period));

            assert_eq!(
                RingRoles::initial(),
                RingRoles::at_phase(period, period),
            );
        }
    }

    #[test]
    fn uninitialized_ring_is_a_no_op() {
        let mut history = HistoryBuffers::new();

        history.advance();

        assert_eq!(0, history.phase());
        assert!(!history.is_initialized());
        assert!(history.write_view_at(0).is_none());
        assert!(history.output_view().is_none());
    }

    #[test]
    fn warm_up_lasts_one_full_cycle() {
        // Frame counting without GPU textures: drive the counter directly
        let mut history = HistoryBuffers {
            textures: Vec::new(),
            multi_frame: true,
            frames: 0,
        };

        // Warm-up frames (1..=3) still clear; afterwards, retained content
        // takes over
        for frame in 1..=3 {
            history.frames = frame;

            assert!(!history.is_warmed_up());
            assert!(history.should_clear_write());
        }

        history.frames = 4;

        assert!(history.is_warmed_up());
        assert!(!history.should_clear_write());
    }
}
