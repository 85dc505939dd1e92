//! Epoch versioned marker tables.

/// An integer table with constant time reset.
///
/// Every entry carries the epoch it was written in; `clear` bumps the current
/// epoch instead of touching the entries, and reads of entries written in an
/// older epoch report the unset sentinel `-1`.
pub struct EpochMarker {
    values: Vec<i32>,
    stamps: Vec<u64>,
    epoch: u64,
}

impl Default for EpochMarker {
    fn default() -> EpochMarker {
        EpochMarker {
            values: vec![],
            stamps: vec![],
            epoch: 1,
        }
    }
}

impl EpochMarker {
    /// Grow the table to the given length.
    pub fn set_len(&mut self, len: usize) {
        self.values.resize(len, 0);
        self.stamps.resize(len, 0);
    }

    /// Write an entry in the current epoch.
    pub fn set(&mut self, index: usize, value: i32) {
        self.values[index] = value;
        self.stamps[index] = self.epoch;
    }

    /// Read an entry, `-1` unless written since the last `clear`.
    pub fn get(&self, index: usize) -> i32 {
        if self.stamps[index] == self.epoch {
            self.values[index]
        } else {
            -1
        }
    }

    /// Forget all entries.
    pub fn clear(&mut self) {
        self.epoch += 1;
    }
}
