//! Cosmetic progress estimate shown while a job is generating.
//!
//! Each poll tick closes a fixed share of the remaining gap to the cap, so the value
//! rises quickly at first and never reaches 100 until the run completes.

const CAP: u8 = 95;
const START: u8 = 10;
/// Share of the remaining gap closed per tick, in percent.
const STEP_PERCENT: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEstimate {
    value: u8,
}

impl Default for ProgressEstimate {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEstimate {
    pub fn new() -> Self {
        Self { value: START }
    }

    pub fn value(self) -> u8 {
        self.value
    }

    pub fn advance(&mut self) -> u8 {
        let gap = u16::from(CAP.saturating_sub(self.value));
        let step = (gap * u16::from(STEP_PERCENT) / 100).max(u16::from(gap > 0));
        self.value = (u16::from(self.value) + step).min(u16::from(CAP)) as u8;
        self.value
    }

    pub fn complete(&mut self) -> u8 {
        self.value = 100;
        self.value
    }
}
