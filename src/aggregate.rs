//! Per-station min/max/sum/count in fixed-point tenths.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StationAggregate {
    pub min: i64,
    pub max: i64,
    /// Exact total. Wide enough that no run of `i64` readings can overflow it.
    pub sum: i128,
    pub count: u64,
}

impl StationAggregate {
    /// Aggregate of a single reading.
    #[inline(always)]
    pub fn new(temp: i64) -> Self {
        Self {
            min: temp,
            max: temp,
            sum: temp as i128,
            count: 1,
        }
    }

    #[inline(always)]
    pub fn record(&mut self, temp: i64) {
        self.min = self.min.min(temp);
        self.max = self.max.max(temp);
        self.sum += temp as i128;
        self.count += 1;
    }

    /// Folds `other` into `self`. Associative and commutative, so partial
    /// aggregates can be merged in any grouping and any order.
    #[inline(always)]
    pub fn combine(&mut self, other: &StationAggregate) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn combined(mut self, other: &StationAggregate) -> Self {
        self.combine(other);
        self
    }

    /// Mean in tenths, rounded half away from zero.
    pub fn mean_tenths(&self) -> i64 {
        let count = self.count as i128;
        let sum = self.sum;
        let rounded = (2 * sum.abs() + count) / (2 * count);
        (if sum < 0 { -rounded } else { rounded }) as i64
    }
}
