//! Entity types - cadastral records and their identifiers

pub mod cadastral;
pub mod catastral_key;

pub use cadastral::{
    Construction, DocumentInfo, GenerationRequest, LandParcel, PropertyRecord, TaxInfo,
};
pub use catastral_key::{CatastralKey, CatastralKeyError, CATASTRAL_KEY_FORMAT};
