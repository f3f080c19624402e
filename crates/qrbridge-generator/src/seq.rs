use crate::Generator;
use qrbridge_core::RandomLink;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequential links of the form `{prefix}{n:06}`, e.g. `qr000000`.
///
/// The counter lives in memory only. A process that restarts against a
/// populated store must be built with [`SeqGenerator::resuming`] so it
/// continues after the highest link already issued.
#[derive(Debug)]
pub struct SeqGenerator {
    next: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            next: AtomicU64::new(self.next.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            next: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }

    /// Starts one past the highest counter found among `existing` links that
    /// carry this prefix. Links with other shapes are ignored.
    pub fn resuming<'a>(
        prefix: impl Into<String>,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let prefix = prefix.into();
        let offset = existing
            .into_iter()
            .filter_map(|link| link.strip_prefix(prefix.as_str()))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|digits| digits.parse::<u64>().ok())
            .max()
            .map_or(0, |highest| highest.saturating_add(1));
        Self::with_offset(prefix, offset)
    }

    /// The counter value the next link will use.
    pub fn next_value(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Generator for SeqGenerator {
    type Output = RandomLink;

    fn generate(&self) -> Self::Output {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        RandomLink::new_unchecked(format!("{}{:06}", self.prefix, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_from_the_offset() {
        let fresh = SeqGenerator::with_prefix("qr");
        assert_eq!(fresh.generate().as_str(), "qr000000");
        assert_eq!(fresh.generate().as_str(), "qr000001");

        let offset = SeqGenerator::with_offset("qr", 1234567);
        assert_eq!(offset.generate().as_str(), "qr1234567");
    }

    #[test]
    fn resumes_after_the_highest_issued_link() {
        let existing = ["qr000004", "qr000017", "ab12xy", "qrcode", "qr", "xqr000900"];
        let generator = SeqGenerator::resuming("qr", existing);

        assert_eq!(generator.next_value(), 18);
        assert_eq!(generator.generate().as_str(), "qr000018");
    }

    #[test]
    fn resuming_an_empty_store_starts_at_zero() {
        let generator = SeqGenerator::resuming("qr", std::iter::empty());
        assert_eq!(generator.generate().as_str(), "qr000000");
    }

    #[test]
    fn clones_continue_independently() {
        let generator = SeqGenerator::with_prefix("qr");
        generator.generate();

        let cloned = generator.clone();
        assert_eq!(cloned.generate().as_str(), "qr000001");
        assert_eq!(cloned.generate().as_str(), "qr000002");
        assert_eq!(generator.generate().as_str(), "qr000001");
    }
}
