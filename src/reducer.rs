use crate::station_map::StationMap;
use crate::worker::Partial;
use crossbeam_channel::Receiver;
use tracing::trace;

/// The merged result of every partial aggregate.
#[derive(Debug, Default)]
pub struct Reduced {
    pub stations: StationMap,
    pub partials: u64,
    pub lines: u64,
    pub skipped: u64,
}

impl Reduced {
    pub fn absorb(&mut self, partial: Partial) {
        self.stations.merge(partial.stations);
        self.partials += 1;
        self.lines += partial.lines;
        self.skipped += partial.skipped;
    }
}

/// Drains `partials` into one global map. Returns once every sender has been
/// dropped and the queue is empty. Arrival order does not affect the result.
pub fn reduce(partials: Receiver<Partial>) -> Reduced {
    let mut reduced = Reduced::default();

    for partial in partials.iter() {
        trace!(stations = partial.stations.len(), "Merging partial");
        reduced.absorb(partial);
    }

    reduced
}
