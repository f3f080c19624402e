pub mod random;
pub mod seq;

pub use random::Base36Generator;
pub use seq::SeqGenerator;

use qrbridge_core::RandomLink;

/// Trait for generating random links.
///
/// Implementations are pure generators that don't interact with storage, so
/// uniqueness is only probable. Callers are expected to handle a conflict
/// reported by the store.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<RandomLink>;

    fn generate(&self) -> Self::Output;
}

/// A generator picked at startup.
#[derive(Debug, Clone)]
pub enum LinkGenerator {
    Random(Base36Generator),
    Seq(SeqGenerator),
}

impl Generator for LinkGenerator {
    type Output = RandomLink;

    fn generate(&self) -> Self::Output {
        match self {
            Self::Random(generator) => generator.generate(),
            Self::Seq(generator) => generator.generate(),
        }
    }
}

impl From<Base36Generator> for LinkGenerator {
    fn from(value: Base36Generator) -> Self {
        Self::Random(value)
    }
}

impl From<SeqGenerator> for LinkGenerator {
    fn from(value: SeqGenerator) -> Self {
        Self::Seq(value)
    }
}
