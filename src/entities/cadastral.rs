//! Cadastral record types as they arrive on the wire
//!
//! Field names follow the source administrative system (Spanish keys), so
//! template placeholders read `{{ predio.0.terreno.valor_terreno_propio }}`.
//! Optional values are `Option<_>` and always serialize, as `null` when
//! absent, so templates render a blank instead of failing on a missing key.

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

use crate::entities::CatastralKey;

/// Land valuation (`terreno`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandParcel {
    #[serde(rename = "valor_terreno_propio")]
    pub private_value: f64,

    /// Square meters
    #[serde(rename = "metros_terreno_propio")]
    pub private_area: f64,

    #[serde(rename = "valor_terreno_comun")]
    pub common_value: f64,

    #[serde(rename = "metros_terreno_comun")]
    pub common_area: f64,
}

/// Built structure valuation (`construccion`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    #[serde(rename = "valor_construccion_propia")]
    pub private_value: f64,

    #[serde(rename = "metros_construccion_propia")]
    pub private_area: f64,

    #[serde(rename = "valor_construccion_comun")]
    pub common_value: f64,

    #[serde(rename = "metros_construccion_comun")]
    pub common_area: f64,
}

/// Tax status (`impuesto`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxInfo {
    #[serde(rename = "recargo", default)]
    pub surcharge: Option<f64>,

    #[serde(rename = "multa", default)]
    pub fine: Option<f64>,

    #[serde(rename = "gastos", default)]
    pub expenses: Option<f64>,

    #[serde(rename = "subsidios", default)]
    pub subsidies: Option<f64>,

    #[serde(rename = "suma", default)]
    pub total: Option<f64>,

    /// Free text, e.g. "2023-6"
    #[serde(rename = "ultimo_periodo_pagado", default)]
    pub last_paid_period: Option<String>,

    #[serde(rename = "impuesto_predial", default)]
    pub predial_tax: Option<f64>,

    #[serde(rename = "monto_a_pagar", default)]
    pub amount_due: Option<f64>,

    #[serde(rename = "cantidad_con_letra", default)]
    pub amount_in_words: Option<String>,
}

/// Document metadata (`documento`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(rename = "fecha_actual", default)]
    pub current_date: Option<String>,

    #[serde(rename = "tipo_documento", default, deserialize_with = "optional_whole_number")]
    pub document_type: Option<u32>,

    #[serde(rename = "fecha_documento", default)]
    pub document_date: Option<String>,

    #[serde(rename = "fecha_ini_vigencia", default)]
    pub valid_from: Option<String>,

    #[serde(rename = "fecha_fin_vigencia", default)]
    pub valid_until: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// JSON Schema counts `7.0` as an integer, so integral floats are accepted too
fn number_to<T: TryFrom<u64>>(number: &Number) -> Option<T> {
    let whole = match number.as_u64() {
        Some(n) => n,
        None => {
            let f = number.as_f64()?;
            if f.fract() != 0.0 || f < 0.0 || f >= u64::MAX as f64 {
                return None;
            }
            f as u64
        }
    };
    T::try_from(whole).ok()
}

fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let number = Number::deserialize(deserializer)?;
    number_to(&number).ok_or_else(|| {
        D::Error::invalid_value(Unexpected::Other(&number.to_string()), &"a whole number in range")
    })
}

fn optional_whole_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    match Option::<Number>::deserialize(deserializer)? {
        Some(number) => number_to(&number).map(Some).ok_or_else(|| {
            D::Error::invalid_value(Unexpected::Other(&number.to_string()), &"a whole number in range")
        }),
        None => Ok(None),
    }
}

/// One property (`predio[i]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(rename = "clave_catastral")]
    pub catastral_key: CatastralKey,

    /// Always positive
    #[serde(deserialize_with = "whole_number")]
    pub folio: u64,

    #[serde(rename = "direccion")]
    pub address: String,

    #[serde(rename = "contribuyente")]
    pub taxpayer_name: String,

    #[serde(rename = "terreno")]
    pub land: LandParcel,

    #[serde(rename = "construccion")]
    pub construction: Construction,

    #[serde(rename = "impuesto")]
    pub tax: TaxInfo,

    /// Missing or null group renders as all-blank fields
    #[serde(rename = "documento", default, deserialize_with = "null_as_default")]
    pub document: DocumentInfo,
}

/// A complete document generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Requested output name; see [`crate::core::filename::normalize_output_name`]
    #[serde(rename = "archivo")]
    pub output_file_name: String,

    #[serde(rename = "plantilla_tipo_documento", default)]
    pub template_id: Option<String>,

    /// Never empty
    #[serde(rename = "predio")]
    pub properties: Vec<PropertyRecord>,
}

impl GenerationRequest {
    /// Template identifier to use, falling back to the configured default
    pub fn template_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.template_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(default)
    }
}
