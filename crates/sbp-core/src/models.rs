use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A product as served by the backend catalogue. Prices are whole rupiah.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: i64,
    pub kode: String,
    pub nama: String,
    pub brand: String,
    pub kategori: String,
    pub satuan: String,
    pub harga_idr: i64,
}

/// Why stock is entering the warehouse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntakeType {
    #[default]
    PembelianPo,
    ReturBarang,
}

impl IntakeType {
    pub const ALL: [IntakeType; 2] = [IntakeType::PembelianPo, IntakeType::ReturBarang];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeType::PembelianPo => "pembelian_po",
            IntakeType::ReturBarang => "retur_barang",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntakeType::PembelianPo => "Purchase order",
            IntakeType::ReturBarang => "Goods return",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IntakeType::PembelianPo => "Stock bought from a supplier against a purchase order.",
            IntakeType::ReturBarang => "Stock returned from a project or customer.",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown intake type {0:?}")]
pub struct UnknownIntakeType(pub String);

impl FromStr for IntakeType {
    type Err = UnknownIntakeType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|intake| intake.as_str() == normalized)
            .ok_or_else(|| UnknownIntakeType(value.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockInItem {
    pub product_id: i64,
    pub product_kode: String,
    #[serde(
        serialize_with = "qty_number::serialize",
        deserialize_with = "rust_decimal::serde::float::deserialize"
    )]
    pub qty: Decimal,
    pub satuan: String,
}

/// Body of `POST /api/stock-movements/batch-in`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockInBatch {
    pub tanggal: NaiveDate,
    pub lokasi: String,
    pub jenis_pemasukan: IntakeType,
    pub items: Vec<StockInItem>,
}

// The backend reads whole quantities as integers, so they go out as `2`, not `2.0`.
mod qty_number {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(qty: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        if qty.fract().is_zero() {
            if let Some(whole) = qty.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        match qty.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => Err(serde::ser::Error::custom("quantity out of range")),
        }
    }
}
