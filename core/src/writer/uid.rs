use chrono::{NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Maximum length of a UI value
const UID_MAX_LEN: usize = 64;

/// Generates DICOM UIDs under a date/time based root
///
/// UIDs look like `2.8.846.0.<YYYYMMDD>.1.<HHMMSS>.<random>`. The time
/// component carries no leading zeros and the random suffix is cut so that
/// the whole UID stays within 64 characters. A fixed seed makes the
/// sequence of generated UIDs reproducible.
pub struct UidGenerator {
    prefix: String,
    rng: StdRng,
}

impl UidGenerator {
    pub fn new(now: NaiveDateTime, seed: Option<u64>) -> Self {
        let time = now.hour() * 10_000 + now.minute() * 100 + now.second();
        let prefix = format!("2.8.846.0.{}.1.{}.", now.format("%Y%m%d"), time);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self { prefix, rng }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Next UID under the prefix
    pub fn generate(&mut self) -> String {
        let mut uid = format!("{}{}", self.prefix, self.rng.random::<u128>());
        uid.truncate(UID_MAX_LEN);
        uid
    }
}
