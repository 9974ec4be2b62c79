//! Synthetic reference series and masks shared by the integration tests

#![allow(dead_code)]

use dicom_core::value::PrimitiveValue;
use dicom_core::{DataElement, Tag, VR};
use dicom_dictionary_std::uids::{EXPLICIT_VR_LITTLE_ENDIAN, MR_IMAGE_STORAGE};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use ndarray::Array3;
use ndarray_npy::write_npy;
use std::path::Path;

pub const SLICES: usize = 10;
pub const ROWS: u16 = 4;
pub const COLUMNS: u16 = 4;
pub const SERIES_UID: &str = "1.2.826.0.1.3680043.2.1125.1.2";
pub const STUDY_UID: &str = "1.2.826.0.1.3680043.2.1125.1";
pub const PATIENT_ID: &str = "ProstateX-0001";

pub fn instance_uid(index: usize) -> String {
    format!("{}.{}", SERIES_UID, index + 1)
}

fn put(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: PrimitiveValue) {
    obj.put(DataElement::new(tag, vr, value));
}

/// One axial MR slice at z = 3 * index
pub fn slice(index: usize) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    put(&mut obj, Tag(0x0008, 0x0016), VR::UI, PrimitiveValue::from(MR_IMAGE_STORAGE));
    put(&mut obj, Tag(0x0008, 0x0018), VR::UI, PrimitiveValue::from(instance_uid(index)));
    put(&mut obj, Tag(0x0008, 0x0060), VR::CS, PrimitiveValue::from("MR"));
    put(&mut obj, Tag(0x0010, 0x0010), VR::PN, PrimitiveValue::from("Doe^Jane"));
    put(&mut obj, Tag(0x0010, 0x0020), VR::LO, PrimitiveValue::from(PATIENT_ID));
    put(&mut obj, Tag(0x0010, 0x0040), VR::CS, PrimitiveValue::from("M"));
    put(&mut obj, Tag(0x0020, 0x000D), VR::UI, PrimitiveValue::from(STUDY_UID));
    put(&mut obj, Tag(0x0020, 0x000E), VR::UI, PrimitiveValue::from(SERIES_UID));
    put(&mut obj, Tag(0x0020, 0x0010), VR::SH, PrimitiveValue::from("S1"));
    put(&mut obj, Tag(0x0008, 0x0020), VR::DA, PrimitiveValue::from("20240307"));
    put(
        &mut obj,
        Tag(0x0020, 0x0052),
        VR::UI,
        PrimitiveValue::from("1.2.826.0.1.3680043.2.1125.9"),
    );
    put(
        &mut obj,
        Tag(0x0020, 0x0032),
        VR::DS,
        PrimitiveValue::Strs(
            vec!["-20".to_string(), "-20".to_string(), format!("{}", 3 * index)].into(),
        ),
    );
    put(
        &mut obj,
        Tag(0x0020, 0x0037),
        VR::DS,
        PrimitiveValue::Strs(
            ["1", "0", "0", "0", "1", "0"]
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .into(),
        ),
    );
    put(
        &mut obj,
        Tag(0x0028, 0x0030),
        VR::DS,
        PrimitiveValue::Strs(vec!["0.5".to_string(), "0.5".to_string()].into()),
    );
    put(&mut obj, Tag(0x0018, 0x0050), VR::DS, PrimitiveValue::from("3"));
    put(&mut obj, Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from(ROWS));
    put(&mut obj, Tag(0x0028, 0x0011), VR::US, PrimitiveValue::from(COLUMNS));
    obj
}

/// Writes the series in reverse order so file names disagree with positions
pub fn write_reference_series(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    for index in 0..SLICES {
        let file_object = slice(index)
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(MR_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid(instance_uid(index)),
            )
            .unwrap();
        let name = format!("IM{:04}.dcm", SLICES - index);
        file_object.write_to_file(dir.join(name)).unwrap();
    }
}

pub fn volume_with(voxels: &[(usize, usize, usize)]) -> Array3<u8> {
    let mut volume = Array3::<u8>::zeros((SLICES, ROWS as usize, COLUMNS as usize));
    for &index in voxels {
        volume[index] = 1;
    }
    volume
}

pub fn write_mask(dir: &Path, tag: &str, volume: &Array3<u8>) {
    std::fs::create_dir_all(dir).unwrap();
    write_npy(dir.join(format!("{}_binary.npy", tag)), volume).unwrap();
}
