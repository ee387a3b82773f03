use derive_more::Display;
use std::collections::HashMap;

/// Which side of the specimen a photograph shows, rendered as the file name
/// suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum View {
    #[display("_D")]
    Dorsal,
    #[display("_V")]
    Ventral,
    #[display("_L")]
    Lateral,
    /// Third and later non-lateral photograph of a specimen; someone has to
    /// sort these out by hand.
    #[display("_MANUAL")]
    Manual,
}

/// How many non-lateral images have been named after each catalogue number
/// during this run.
///
/// ```
/// use dmread_library::{Occurrences, View};
/// let mut seen = Occurrences::default();
/// assert_eq!(seen.next_view(1234), View::Dorsal);
/// seen.commit(1234);
/// assert_eq!(seen.next_view(1234), View::Ventral);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Occurrences {
    counts: HashMap<u64, u32>,
}
impl Occurrences {
    pub fn count(&self, number: u64) -> u32 {
        self.counts.get(&number).copied().unwrap_or_default()
    }

    /// The view the next non-lateral image of `number` gets. Does not count
    /// it; call [`commit`](Self::commit) once the image has its name.
    pub fn next_view(&self, number: u64) -> View {
        match self.count(number) {
            0 => View::Dorsal,
            1 => View::Ventral,
            _ => View::Manual,
        }
    }

    pub fn commit(&mut self, number: u64) {
        let count = self.counts.entry(number).or_default();
        *count = count.saturating_add(1);
    }
}
