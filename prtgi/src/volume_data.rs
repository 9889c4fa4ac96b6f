use glam::Vec3;

use crate::gpu::{Surfel, RAYS_PER_PROBE, SURFEL_FLOATS};
use crate::{Error, Result};

/// The volume's only durable state: every probe's surfels, flattened to
/// floats in probe-grid order, plus the position the volume was baked at.
///
/// The persistence layer stores this record opaquely; this type only defines
/// the packing and the staleness rules.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VolumeData {
    pub position: Vec3,
    pub surfels: Vec<f32>,
}

impl VolumeData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.position = Vec3::ZERO;
        self.surfels = Vec::new();
    }

    /// Packs every probe's surfel set; `probes` must come in probe-grid
    /// order.
    pub fn pack<'a>(
        position: Vec3,
        probes: impl IntoIterator<Item = &'a [Surfel]>,
    ) -> Self {
        let mut surfels = Vec::new();

        for probe_surfels in probes {
            surfels.extend_from_slice(bytemuck::cast_slice(probe_surfels));
        }

        Self { position, surfels }
    }

    /// Checks this record against the live grid; persisted surfels are only
    /// usable if the shape and the recorded position match exactly.
    pub fn validate(
        &self,
        probe_count: usize,
        position: Vec3,
    ) -> Result<()> {
        let expected = probe_count * RAYS_PER_PROBE * SURFEL_FLOATS;

        if self.surfels.len() != expected {
            return Err(Error::StaleDataLength {
                expected,
                found: self.surfels.len(),
            });
        }

        if self.position != position {
            return Err(Error::StaleDataPosition {
                expected: position,
                found: self.position,
            });
        }

        Ok(())
    }

    /// Surfels of the `probe_index`-th probe; call only after
    /// [`Self::validate()`] passed.
    pub fn unpack_probe(&self, probe_index: usize) -> &[Surfel] {
        let floats_per_probe = RAYS_PER_PROBE * SURFEL_FLOATS;
        let offset = probe_index * floats_per_probe;

        bytemuck::cast_slice(&self.surfels[offset..offset + floats_per_probe])
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    fn probe_surfels(tag: f32) -> Vec<Surfel> {
        (0..RAYS_PER_PROBE)
            .map(|i| Surfel {
                position: vec3(tag, i as f32, 0.5),
                normal: vec3(0.0, 1.0, 0.0),
                albedo: vec3(0.25, 0.5, 0.75),
                sky_mask: 0.0,
            })
            .collect()
    }

    #[test]
    fn round_trip_is_bit_exact() {
        let probes = [probe_surfels(1.0), probe_surfels(2.0)];

        let data = VolumeData::pack(
            vec3(5.0, 0.0, 5.0),
            probes.iter().map(|surfels| surfels.as_slice()),
        );

        assert!(data.validate(2, vec3(5.0, 0.0, 5.0)).is_ok());

        for (index, surfels) in probes.iter().enumerate() {
            assert_eq!(surfels.as_slice(), data.unpack_probe(index));
        }
    }

    #[test]
    fn stale_length_is_rejected() {
        let mut data = VolumeData::pack(
            Vec3::ZERO,
            [probe_surfels(1.0).as_slice()],
        );

        data.surfels.pop();

        assert!(matches!(
            data.validate(1, Vec3::ZERO),
            Err(Error::StaleDataLength { .. }),
        ));

        // Wrong probe count means wrong expected length, too
        let data = VolumeData::pack(
            Vec3::ZERO,
            [probe_surfels(1.0).as_slice()],
        );

        assert!(data.validate(2, Vec3::ZERO).is_err());
    }

    #[test]
    fn stale_position_is_rejected() {
        let data = VolumeData::pack(
            vec3(1.0, 2.0, 3.0),
            [probe_surfels(1.0).as_slice()],
        );

        assert!(matches!(
            data.validate(1, vec3(1.0, 2.0, 3.5)),
            Err(Error::StaleDataPosition { .. }),
        ));
    }

    #[test]
    fn all_sky_bake_scenario() {
        // A 2×1×2 grid baked against open sky: every surfel is a sky surfel
        // and the packed record carries 4 * 512 * 10 floats
        let probe: Vec<_> = (0..RAYS_PER_PROBE)
            .map(|_| Surfel::sky(Vec3::ZERO, vec3(0.0, 1.0, 0.0)))
            .collect();

        let data = VolumeData::pack(
            Vec3::ZERO,
            (0..4).map(|_| probe.as_slice()),
        );

        assert_eq!(20480, data.surfels.len());

        for index in 0..4 {
            assert!(data
                .unpack_probe(index)
                .iter()
                .all(|surfel| surfel.sky_mask == 1.0));
        }

        // Loading it against an unrelated position must flag it stale
        assert!(data.validate(4, vec3(100.0, 0.0, 0.0)).is_err());
        assert!(data.validate(4, Vec3::ZERO).is_ok());
    }
}
