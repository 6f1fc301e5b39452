//! [`TelemetryClient`] over a synchronous PostgreSQL connection.
//!
//! Works with a plain `postgres::Client` or, through the `&mut C` impl, with a
//! connection checked out of an r2d2 pool (`&mut *pooled`).

use std::error::Error;

use r2d2_postgres::postgres::types::{FromSql, Type};
use r2d2_postgres::postgres::{Client, Row};

use crate::error::{NetdevError, Result};
use crate::sample::COUNTER_COUNT;
use crate::sources::remote::{NetdevRow, TelemetryClient};

type BoxError = Box<dyn Error + Sync + Send>;

/// Leading columns of a counters row before the counters: trimmed name and
/// raw name.
const NAME_COLUMNS: usize = 2;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;

/// Any integer, float or `numeric` column widened to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Number(f64);

impl<'a> FromSql<'a> for Number {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        let v = match *ty {
            Type::FLOAT8 => f64::from_sql(ty, raw)?,
            Type::FLOAT4 => f64::from(f32::from_sql(ty, raw)?),
            Type::INT8 => i64::from_sql(ty, raw)? as f64,
            Type::INT4 => f64::from(i32::from_sql(ty, raw)?),
            Type::INT2 => f64::from(i16::from_sql(ty, raw)?),
            Type::NUMERIC => decode_numeric(raw)?,
            _ => return Err(format!("cannot read {ty} as a number").into()),
        };
        Ok(Number(v))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::FLOAT8 | Type::FLOAT4 | Type::INT8 | Type::INT4 | Type::INT2 | Type::NUMERIC
        )
    }
}

/// Binary `numeric`: ndigits, weight, sign, dscale, then base-10000 digits.
fn decode_numeric(raw: &[u8]) -> std::result::Result<f64, BoxError> {
    let word = |i: usize| -> std::result::Result<u16, BoxError> {
        raw.get(i * 2..i * 2 + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric".into())
    };
    let ndigits = usize::from(word(0)?);
    let weight = i32::from(word(1)? as i16);
    let sign = word(2)?;
    if sign != NUMERIC_POS && sign != NUMERIC_NEG {
        return Err(format!("non-finite numeric (sign {sign:#06x})").into());
    }

    let mut value = 0.0_f64;
    for i in 0..ndigits {
        let digit = f64::from(word(4 + i)?);
        value += digit * 10_000_f64.powi(weight - i as i32);
    }
    Ok(if sign == NUMERIC_NEG { -value } else { value })
}

fn numeric(row: &Row, idx: usize) -> std::result::Result<f64, String> {
    row.try_get::<_, Number>(idx)
        .map(|n| n.0)
        .map_err(|e| format!("column {idx}: {e}"))
}

/// Counters of one row of `len` columns, read through `get`.
fn decode_counters(
    len: usize,
    get: impl Fn(usize) -> std::result::Result<f64, String>,
) -> std::result::Result<[f64; COUNTER_COUNT], String> {
    let expected = NAME_COLUMNS + COUNTER_COUNT;
    if len != expected {
        return Err(format!("expected {expected} columns, found {len}"));
    }
    let mut counters = [0.0_f64; COUNTER_COUNT];
    for (i, slot) in counters.iter_mut().enumerate() {
        *slot = get(NAME_COLUMNS + i)?;
    }
    Ok(counters)
}

/// NULL speed reads as 0 (unknown), NULL duplex as -1 (unknown).
fn link_pair(speed: Option<i64>, duplex: Option<i64>) -> (i64, i64) {
    (speed.unwrap_or(0), duplex.unwrap_or(-1))
}

impl TelemetryClient for Client {
    fn schema_exists(&mut self, query: &str) -> Result<bool> {
        let row = self
            .query_one(query, &[])
            .map_err(|e| NetdevError::unavailable(query, e))?;
        row.try_get::<_, bool>(0)
            .map_err(|e| NetdevError::malformed(query, 1, e.to_string()))
    }

    fn uptime(&mut self, query: &str) -> Result<f64> {
        let row = self
            .query_one(query, &[])
            .map_err(|e| NetdevError::unavailable(query, e))?;
        numeric(&row, 0).map_err(|detail| NetdevError::malformed(query, 1, detail))
    }

    fn netdev_rows(&mut self, query: &str) -> Result<Vec<NetdevRow>> {
        let rows = self
            .query(query, &[])
            .map_err(|e| NetdevError::unavailable(query, e))?;

        let mut out = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let lineno = idx + 1;
            let counters = decode_counters(row.len(), |i| numeric(row, i))
                .map_err(|detail| NetdevError::malformed(query, lineno, detail))?;
            let name: String = row
                .try_get(0)
                .map_err(|e| NetdevError::malformed(query, lineno, e.to_string()))?;
            out.push(NetdevRow { name, counters });
        }
        Ok(out)
    }

    fn link_settings(&mut self, query: &str, iface: &str) -> Result<(i64, i64)> {
        let row = self
            .query_one(query, &[&iface])
            .map_err(|e| NetdevError::unavailable(format!("{query} [{iface}]"), e))?;
        let speed = row
            .try_get::<_, Option<i64>>(0)
            .map_err(|e| NetdevError::malformed(query, 1, e.to_string()))?;
        let duplex = row
            .try_get::<_, Option<i64>>(1)
            .map_err(|e| NetdevError::malformed(query, 1, e.to_string()))?;
        Ok(link_pair(speed, duplex))
    }
}
