//! Progress reporting: converts chunk or byte counts into integer
//! percentages and forwards them to the caller's callback.

/// Percentage after `completed` of `total` chunks, rounded to the nearest integer.
pub fn chunk_percent(completed: u32, total: u32) -> u8 {
    ratio_percent(completed as u64, total as u64)
}

/// Percentage of `loaded` out of `total` bytes, rounded to the nearest integer.
pub fn byte_percent(loaded: u64, total: u64) -> u8 {
    ratio_percent(loaded, total)
}

fn ratio_percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (done as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Forwards percentages to an optional callback.
///
/// Only values above the last reported one are forwarded, so the caller sees
/// a strictly increasing sequence capped at 100.
pub struct ProgressReporter<'a> {
    callback: Option<&'a mut (dyn FnMut(u8) + Send)>,
    last: Option<u8>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: Option<&'a mut (dyn FnMut(u8) + Send)>) -> Self {
        Self {
            callback,
            last: None,
        }
    }

    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        if let Some(cb) = self.callback.as_deref_mut() {
            cb(percent);
        }
    }

    #[cfg(test)]
    fn last(&self) -> Option<u8> {
        self.last
    }
}
