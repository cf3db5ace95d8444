//! Instance identifiers (IIDs).
//!
//! An IID addresses a MIB field: `structure.object[.index1[.index2]]`.
//!
//! - [`RawIid`] is the wire form, 2 to 4 signed components, stored in a
//!   `SmallVec` so it never allocates.
//! - [`Iid`] is the parsed form, with the table index shape normalized into a
//!   [`TableIndex`].

use std::fmt;

use smallvec::SmallVec;

use crate::error::{Error, IidErrorKind, Result};
use crate::wire::{Decoder, EncodeBuf, tag};

/// Minimum number of IID components.
pub const MIN_IID_LEN: usize = 2;

/// Maximum number of IID components.
pub const MAX_IID_LEN: usize = 4;

/// Top-level object group addressed by an IID's structure component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Scalar device fields (structure 1).
    Device,
    /// Sensor table (structure 2).
    Sensors,
    /// Actuator table (structure 3).
    Actuators,
}

impl Group {
    /// Look up a group by structure number.
    pub fn from_structure(structure: u32) -> Option<Self> {
        match structure {
            1 => Some(Group::Device),
            2 => Some(Group::Sensors),
            3 => Some(Group::Actuators),
            _ => None,
        }
    }

    /// The structure number of this group.
    pub fn structure(self) -> u32 {
        match self {
            Group::Device => 1,
            Group::Sensors => 2,
            Group::Actuators => 3,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Device => write!(f, "device"),
            Group::Sensors => write!(f, "sensors"),
            Group::Actuators => write!(f, "actuators"),
        }
    }
}

/// Row selector of a table IID.
///
/// Normalized at parse time, interpreted against the live table length at
/// resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableIndex {
    /// No index: the first row.
    First,
    /// `[0]`: the number of rows.
    RowCount,
    /// `[n]`: row `n`, 1-based.
    Row(u32),
    /// `[0, 0]`: every row.
    AllRows,
    /// `[lo, hi]`: rows `lo..=hi`, 1-based.
    Range(u32, u32),
}

impl TableIndex {
    fn from_components(indexes: &[i64]) -> Result<Self> {
        if let Some(&negative) = indexes.iter().find(|&&i| i < 0) {
            return Err(Error::invalid_iid(IidErrorKind::NegativeIndex(negative)));
        }
        // components above u32::MAX can never name a row
        let narrow = |i: i64| u32::try_from(i).unwrap_or(u32::MAX);
        Ok(match *indexes {
            [] => TableIndex::First,
            [0] => TableIndex::RowCount,
            [n] => TableIndex::Row(narrow(n)),
            [0, 0] => TableIndex::AllRows,
            [lo, hi, ..] => TableIndex::Range(narrow(lo), narrow(hi)),
        })
    }

    fn push_components(&self, out: &mut SmallVec<[i64; MAX_IID_LEN]>) {
        match *self {
            TableIndex::First => {}
            TableIndex::RowCount => out.push(0),
            TableIndex::Row(n) => out.push(i64::from(n)),
            TableIndex::AllRows => out.extend([0, 0]),
            TableIndex::Range(lo, hi) => out.extend([i64::from(lo), i64::from(hi)]),
        }
    }
}

/// Wire form of an IID: 2 to 4 signed integers.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawIid {
    components: SmallVec<[i64; MAX_IID_LEN]>,
}

impl RawIid {
    /// Create from components, checking only the component count.
    pub fn new(components: impl IntoIterator<Item = i64>) -> Result<Self> {
        let components: SmallVec<[i64; MAX_IID_LEN]> = components.into_iter().collect();
        check_len(components.len())?;
        Ok(Self { components })
    }

    /// Create from a slice of components without checking the count.
    ///
    /// An out-of-range count is caught when the IID is encoded or parsed.
    pub fn from_slice(components: &[i64]) -> Self {
        Self {
            components: SmallVec::from_slice(components),
        }
    }

    /// Parse dotted text, checking the count and that every component is an
    /// integer. Range checks are left to [`Iid`].
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        check_len(parts.len())?;
        let components = parts
            .iter()
            .map(|p| p.parse::<i64>())
            .collect::<std::result::Result<SmallVec<_>, _>>()
            .map_err(|_| Error::invalid_iid(IidErrorKind::NonInteger))?;
        Ok(Self { components })
    }

    /// The components.
    pub fn components(&self) -> &[i64] {
        &self.components
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if there are no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn encode(&self, buf: &mut EncodeBuf) -> Result<()> {
        check_len(self.len())?;
        buf.push_tag(tag::IID);
        buf.push_count(self.len());
        for &c in &self.components {
            buf.push_integer(c);
        }
        Ok(())
    }

    pub(crate) fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.expect_tag(tag::IID)?;
        let len_offset = decoder.offset();
        let len = decoder.read_count()?;
        if !(MIN_IID_LEN..=MAX_IID_LEN).contains(&len) {
            tracing::debug!(target: "lsnmpvs::codec", { lsnmp.offset = len_offset, len }, "IID length out of range");
            return Err(Error::invalid_iid(IidErrorKind::Shape { len }));
        }
        let mut components = SmallVec::new();
        for _ in 0..len {
            components.push(decoder.read_signed()?);
        }
        Ok(Self { components })
    }
}

fn check_len(len: usize) -> Result<()> {
    if (MIN_IID_LEN..=MAX_IID_LEN).contains(&len) {
        Ok(())
    } else {
        Err(Error::invalid_iid(IidErrorKind::Shape { len }))
    }
}

impl fmt::Debug for RawIid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawIid({})", self)
    }
}

impl fmt::Display for RawIid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for c in &self.components {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", c)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for RawIid {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&Iid> for RawIid {
    fn from(iid: &Iid) -> Self {
        iid.to_raw()
    }
}

/// Parsed IID.
///
/// Structure is at least 1 and object at least 0; whether they name an
/// existing group and field is decided by the MIB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Iid {
    structure: u32,
    object: u32,
    index: TableIndex,
}

impl Iid {
    /// Parse dotted text.
    ///
    /// Checks run in order: component count, integer components, structure,
    /// object, indexes.
    ///
    /// # Examples
    ///
    /// ```
    /// use lsnmpvs::iid::{Iid, TableIndex};
    ///
    /// let iid = Iid::parse("2.1.3").unwrap();
    /// assert_eq!(iid.structure(), 2);
    /// assert_eq!(iid.object(), 1);
    /// assert_eq!(iid.index(), TableIndex::Row(3));
    ///
    /// assert!(Iid::parse("2").is_err());
    /// assert!(Iid::parse("0.1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        Self::try_from(&RawIid::parse(s)?)
    }

    /// Build from components.
    pub fn from_components(components: &[i64]) -> Result<Self> {
        check_len(components.len())?;
        let structure = components[0];
        if structure <= 0 {
            return Err(Error::invalid_iid(IidErrorKind::Structure(structure)));
        }
        let object = components[1];
        if object < 0 {
            return Err(Error::invalid_iid(IidErrorKind::Object(object)));
        }
        let index = TableIndex::from_components(&components[2..])?;
        Ok(Self {
            structure: u32::try_from(structure).unwrap_or(u32::MAX),
            object: u32::try_from(object).unwrap_or(u32::MAX),
            index,
        })
    }

    /// Scalar IID with no indexes.
    pub fn scalar(structure: u32, object: u32) -> Self {
        Self {
            structure: structure.max(1),
            object,
            index: TableIndex::First,
        }
    }

    /// Table IID with an explicit index shape.
    pub fn table(structure: u32, object: u32, index: TableIndex) -> Self {
        Self {
            structure: structure.max(1),
            object,
            index,
        }
    }

    pub fn structure(&self) -> u32 {
        self.structure
    }

    pub fn object(&self) -> u32 {
        self.object
    }

    pub fn index(&self) -> TableIndex {
        self.index
    }

    /// Group addressed by the structure, if it names one.
    pub fn group(&self) -> Option<Group> {
        Group::from_structure(self.structure)
    }

    /// Convert back to wire form.
    pub fn to_raw(&self) -> RawIid {
        let mut components = SmallVec::new();
        components.push(i64::from(self.structure));
        components.push(i64::from(self.object));
        self.index.push_components(&mut components);
        RawIid { components }
    }
}

impl TryFrom<&RawIid> for Iid {
    type Error = Box<Error>;

    fn try_from(raw: &RawIid) -> Result<Self> {
        Self::from_components(raw.components())
    }
}

impl fmt::Display for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_raw().fmt(f)
    }
}

impl std::str::FromStr for Iid {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Build a [`RawIid`] from components.
///
/// ```
/// use lsnmpvs::iid;
///
/// let raw = iid![2, 3, 0, 0];
/// assert_eq!(raw.to_string(), "2.3.0.0");
/// ```
#[macro_export]
macro_rules! iid {
    ($($c:expr),* $(,)?) => {
        $crate::iid::RawIid::from_slice(&[$($c),*])
    };
}
