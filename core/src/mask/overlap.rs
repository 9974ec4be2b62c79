use super::MaskSet;
use crate::types::SegmentClass;
use log::debug;
use ndarray::{Array3, Zip};
use std::collections::BTreeMap;

/// Makes class extents mutually exclusive
///
/// A binary segmentation may not claim one voxel for two segments. The
/// lowest-priority class keeps its raw extent; every other class loses the
/// voxels claimed by any lower-priority class that is present. With all
/// three classes this gives: tz unchanged, pz minus tz, wg minus (pz or tz).
pub struct OverlapResolver;

impl OverlapResolver {
    /// Resolves overlaps between every class of the set
    ///
    /// Only siblings that are actually present take part in the
    /// subtraction.
    pub fn resolve(masks: &MaskSet) -> BTreeMap<SegmentClass, Array3<bool>> {
        let mut resolved = BTreeMap::new();
        let mut claimed: Option<Array3<bool>> = None;

        for mask in masks.iter().rev() {
            let mut volume = mask.raw.clone();
            let claimed =
                claimed.get_or_insert_with(|| Array3::from_elem(mask.raw.raw_dim(), false));

            Zip::from(&mut volume)
                .and(&*claimed)
                .for_each(|voxel, &taken| *voxel = *voxel && !taken);
            Zip::from(claimed)
                .and(&mask.raw)
                .for_each(|taken, &voxel| *taken = *taken || voxel);

            let removed = mask.raw.iter().filter(|&&v| v).count()
                - volume.iter().filter(|&&v| v).count();
            if removed > 0 {
                debug!("Removed {} overlapping voxels from {}", removed, mask.class);
            }

            resolved.insert(mask.class, volume);
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskIngestor;
    use rstest::rstest;

    fn volume_with(voxels: &[(usize, usize, usize)]) -> Array3<u8> {
        let mut volume = Array3::<u8>::zeros((10, 4, 4));
        for &index in voxels {
            volume[index] = 1;
        }
        volume
    }

    fn mask_set(volumes: Vec<(SegmentClass, Array3<u8>)>) -> MaskSet {
        let source: BTreeMap<_, _> = volumes.into_iter().collect();
        MaskIngestor::ingest_with_shape(&source, (10, 4, 4)).unwrap()
    }

    fn assert_exclusive(resolved: &BTreeMap<SegmentClass, Array3<bool>>) {
        let volumes: Vec<_> = resolved.values().collect();
        for (i, a) in volumes.iter().enumerate() {
            for b in &volumes[i + 1..] {
                assert!(a.iter().zip(b.iter()).all(|(&x, &y)| !(x && y)));
            }
        }
    }

    #[test]
    fn test_wg_pz_overlap_goes_to_pz() {
        let masks = mask_set(vec![
            (SegmentClass::Wg, volume_with(&[(2, 1, 1), (2, 1, 2)])),
            (SegmentClass::Pz, volume_with(&[(2, 1, 1)])),
            (SegmentClass::Tz, volume_with(&[(7, 3, 3)])),
        ]);

        let resolved = OverlapResolver::resolve(&masks);

        assert!(!resolved[&SegmentClass::Wg][(2, 1, 1)]);
        assert!(resolved[&SegmentClass::Wg][(2, 1, 2)]);
        assert!(resolved[&SegmentClass::Pz][(2, 1, 1)]);
        assert_exclusive(&resolved);
    }

    #[test]
    fn test_wg_loses_tz_voxels_too() {
        let masks = mask_set(vec![
            (SegmentClass::Wg, volume_with(&[(4, 0, 0), (4, 0, 1)])),
            (SegmentClass::Pz, volume_with(&[(4, 0, 0)])),
            (SegmentClass::Tz, volume_with(&[(4, 0, 1)])),
        ]);

        let resolved = OverlapResolver::resolve(&masks);

        assert!(resolved[&SegmentClass::Wg].iter().all(|&v| !v));
        assert!(resolved[&SegmentClass::Pz][(4, 0, 0)]);
        assert!(resolved[&SegmentClass::Tz][(4, 0, 1)]);
    }

    #[rstest]
    #[case(SegmentClass::Wg, SegmentClass::Pz)]
    #[case(SegmentClass::Wg, SegmentClass::Tz)]
    #[case(SegmentClass::Pz, SegmentClass::Tz)]
    fn test_two_classes_lower_priority_wins(
        #[case] higher: SegmentClass,
        #[case] lower: SegmentClass,
    ) {
        let masks = mask_set(vec![
            (higher, volume_with(&[(1, 2, 2), (1, 2, 3)])),
            (lower, volume_with(&[(1, 2, 2)])),
        ]);

        let resolved = OverlapResolver::resolve(&masks);

        assert_eq!(resolved.len(), 2);
        assert!(!resolved[&higher][(1, 2, 2)]);
        assert!(resolved[&higher][(1, 2, 3)]);
        assert!(resolved[&lower][(1, 2, 2)]);
        assert_exclusive(&resolved);
    }

    #[test]
    fn test_single_class_is_untouched() {
        let masks = mask_set(vec![(SegmentClass::Pz, volume_with(&[(0, 0, 0), (9, 3, 3)]))]);

        let resolved = OverlapResolver::resolve(&masks);

        assert_eq!(resolved[&SegmentClass::Pz], masks.get(SegmentClass::Pz).unwrap().raw);
    }
}
