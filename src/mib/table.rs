//! Sensor and actuator tables (structures 2 and 3).
//!
//! Each table is a static list of columns; a column maps an object number to
//! a reader over one record.

use rand::rngs::StdRng;

use crate::device::{Actuator, Record, Registry, Sensor};
use crate::error::{Error, IidErrorKind, Result};
use crate::iid::{Group, Iid, TableIndex};
use crate::timestamp::DateStamp;
use crate::value::Value;

use super::MibValue;

/// Context handed to column readers.
pub(crate) struct ReadCtx<'a> {
    pub rng: &'a mut StdRng,
    pub now: DateStamp,
}

pub(crate) struct Column<T> {
    pub object: u32,
    pub name: &'static str,
    pub read: fn(&mut T, &mut ReadCtx<'_>) -> Value,
}

/// Sensor columns, objects 1..=7.
pub(crate) const SENSOR_COLUMNS: &[Column<Sensor>] = &[
    Column {
        object: 1,
        name: "id",
        read: |s, _| Value::from(s.id()),
    },
    Column {
        object: 2,
        name: "type",
        read: |s, _| Value::from(s.sensor_type()),
    },
    Column {
        object: 3,
        name: "value",
        read: |s, ctx| Value::Integer(s.read_value(&mut *ctx.rng, ctx.now)),
    },
    Column {
        object: 4,
        name: "min",
        read: |s, _| Value::Integer(s.min()),
    },
    Column {
        object: 5,
        name: "max",
        read: |s, _| Value::Integer(s.max()),
    },
    Column {
        object: 6,
        name: "status",
        read: |s, _| Value::Integer(s.status()),
    },
    Column {
        object: 7,
        name: "lastSamplingTime",
        read: |s, _| Value::from(s.last_sampling_time()),
    },
];

/// Actuator object holding the writable status.
pub(crate) const ACTUATOR_STATUS: u32 = 3;

/// Actuator columns, objects 1..=6.
pub(crate) const ACTUATOR_COLUMNS: &[Column<Actuator>] = &[
    Column {
        object: 1,
        name: "id",
        read: |a, _| Value::from(a.id()),
    },
    Column {
        object: 2,
        name: "type",
        read: |a, _| Value::from(a.actuator_type()),
    },
    Column {
        object: ACTUATOR_STATUS,
        name: "status",
        read: |a, _| Value::Integer(a.status()),
    },
    Column {
        object: 4,
        name: "min",
        read: |a, _| Value::Integer(a.min()),
    },
    Column {
        object: 5,
        name: "max",
        read: |a, _| Value::Integer(a.max()),
    },
    Column {
        object: 6,
        name: "lastControlTime",
        read: |a, _| Value::from(a.last_control_time()),
    },
];

/// Look up the column for `object`, failing with an IID error.
pub(crate) fn column<T>(
    columns: &'static [Column<T>],
    group: Group,
    object: u32,
) -> Result<&'static Column<T>> {
    columns.iter().find(|c| c.object == object).ok_or_else(|| {
        Error::invalid_iid(IidErrorKind::UnknownObject { group, object })
    })
}

/// Resolve a table read.
///
/// Checks run in order: object, empty table, index bounds. Only then is any
/// reader invoked, so a rejected read never resamples.
pub(crate) fn read<T: Record>(
    registry: &mut Registry<T>,
    columns: &'static [Column<T>],
    group: Group,
    iid: &Iid,
    ctx: &mut ReadCtx<'_>,
) -> Result<MibValue> {
    if iid.object() == 0 {
        return Ok(MibValue::Single(Value::Integer(columns.len() as i64)));
    }
    let column = column(columns, group, iid.object())?;
    tracing::trace!(target: "lsnmpvs::mib", { %group, column = column.name, index = ?iid.index() }, "table read");

    if registry.is_empty() {
        return Err(Error::NoDevicesRegistered { group }.boxed());
    }
    let len = registry.len();

    match iid.index() {
        TableIndex::RowCount => Ok(MibValue::Single(Value::Integer(len as i64))),
        TableIndex::First => read_row(registry, column, 1, ctx),
        TableIndex::Row(row) => read_row(registry, column, row, ctx),
        TableIndex::AllRows => Ok(MibValue::Column(
            registry.iter_mut().map(|r| (column.read)(r, ctx)).collect(),
        )),
        TableIndex::Range(lo, hi) => {
            if lo < 1 || lo > hi || hi as usize > len {
                return Err(Error::invalid_iid(IidErrorKind::RangeOutOfBounds { lo, hi, len }));
            }
            let skip = (lo - 1) as usize;
            let take = (hi - lo + 1) as usize;
            Ok(MibValue::Column(
                registry
                    .iter_mut()
                    .skip(skip)
                    .take(take)
                    .map(|r| (column.read)(r, ctx))
                    .collect(),
            ))
        }
    }
}

fn read_row<T: Record>(
    registry: &mut Registry<T>,
    column: &Column<T>,
    row: u32,
    ctx: &mut ReadCtx<'_>,
) -> Result<MibValue> {
    let len = registry.len();
    let record = registry
        .row_mut(row)
        .ok_or_else(|| Error::invalid_iid(IidErrorKind::RowOutOfRange { row, len }))?;
    Ok(MibValue::Single((column.read)(record, ctx)))
}
