//! Face sets.
//!
//! Face sets group faces of a mesh for material assignment or other
//! organizational purposes. They are written once, with the first sample.

use crate::util::{Error, Result};

/// Hint to indicate face membership is mutually exclusive.
///
/// Some structures that group faces only allow a face to belong
/// to one FaceSet, while other times a face is allowed to belong
/// to any number of FaceSets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceSetExclusivity {
    /// Faces can belong to multiple FaceSets (default).
    #[default]
    NonExclusive = 0,
    /// Faces can only belong to one FaceSet.
    Exclusive = 1,
}

/// A named set of faces, keyed by face index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceSet {
    /// Set name.
    pub name: String,
    /// Face indices that belong to this face set.
    pub faces: Vec<i32>,
    /// Membership hint.
    pub exclusivity: FaceSetExclusivity,
}

impl FaceSet {
    /// Build a face set, checking every member against `num_faces`.
    pub fn new(name: impl Into<String>, faces: &[u32], num_faces: usize) -> Result<Self> {
        let name = name.into();
        let mut members = Vec::with_capacity(faces.len());
        for &f in faces {
            match i32::try_from(f) {
                Ok(face) if (f as usize) < num_faces => members.push(face),
                _ => {
                    return Err(Error::InvalidFaceSetIndex {
                        name,
                        face: f as i64,
                        count: num_faces,
                    })
                }
            }
        }
        Ok(Self {
            name,
            faces: members,
            exclusivity: FaceSetExclusivity::NonExclusive,
        })
    }

    /// Check if set has members.
    pub fn is_valid(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Get number of faces in this face set.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Check if a face index is in this face set.
    pub fn contains(&self, face_index: i32) -> bool {
        self.faces.contains(&face_index)
    }
}
