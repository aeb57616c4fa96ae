//! Text output: one `<station>=<min>/<mean>/<max>` line per station.
//!
//! Aggregates are stored in tenths of a degree; this is the only place they
//! are rescaled to degrees.

use crate::aggregate::StationAggregate;
use crate::station_map::StationMap;
use crate::temperature::write_tenths;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Bytewise by station name
    #[default]
    Sorted,
    /// Whatever order the map iterates in
    Unsorted,
}

// `<min>/<mean>/<max>` in degrees.
fn push_values(buf: &mut String, station: &StationAggregate) {
    // Writing into a String cannot fail.
    let _ = write_tenths(buf, station.min);
    buf.push('/');
    let _ = write_tenths(buf, station.mean_tenths());
    buf.push('/');
    let _ = write_tenths(buf, station.max);
}

pub fn write_report<W: Write>(out: &mut W, stations: &StationMap, order: Order) -> io::Result<()> {
    let entries = match order {
        Order::Sorted => stations.sorted(),
        Order::Unsorted => stations.iter().collect(),
    };

    let mut values = String::with_capacity(24);
    for (name, station) in entries {
        values.clear();
        push_values(&mut values, station);

        // Names are written as raw bytes, no UTF-8 assumptions.
        out.write_all(name)?;
        out.write_all(b"=")?;
        out.write_all(values.as_bytes())?;
        out.write_all(b"\n")?;
    }

    out.flush()
}
