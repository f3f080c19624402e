use crate::Generator;
use qrbridge_core::RandomLink;
use rand::Rng;
use typed_builder::TypedBuilder;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produces short, human-opaque base-36 links such as `k3x9q0m1b7ze`.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Base36Generator {
    /// Number of base-36 digits per link.
    #[builder(default = 12)]
    length: usize,
}

impl Base36Generator {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    fn next_link<R: Rng>(&self, rng: &mut R) -> RandomLink {
        let link: String = (0..self.length.max(1))
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        RandomLink::new_unchecked(link)
    }
}

impl Default for Base36Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for Base36Generator {
    type Output = RandomLink;

    fn generate(&self) -> Self::Output {
        self.next_link(&mut rand::thread_rng())
    }
}
