//! Pre-generation passes that rewrite attribute values
//!
//! A pass is registered on the [`Generator`](super::Generator) under a snippet
//! name and runs on every instance of that class before any pattern is
//! expanded.

use tracing::debug;

/// A value rewrite applied to one instance before generation
pub trait PrePass: Send + Sync {
    /// Rewrite `values` in place; indices follow the class's attribute order
    fn apply(&self, instance: &str, values: &mut [String]);
}

impl<F> PrePass for F
where
    F: Fn(&str, &mut [String]) + Send + Sync,
{
    fn apply(&self, instance: &str, values: &mut [String]) {
        self(instance, values)
    }
}

/// Colors [`DistinctColors`] assigns, in preference order
pub const PALETTE: [&str; 10] = [
    "black", "white", "red", "green", "blue", "yellow", "pink", "orange", "cyan", "magenta",
];

/// Gives each attribute of an instance a different palette color
///
/// When a palette color is chosen by several attributes, occurrences are
/// reassigned from the last attribute backwards to the first color nobody
/// uses, so the earliest attribute keeps its choice. Values outside the
/// palette are left alone. Once the palette is exhausted the value becomes
/// empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctColors;

impl PrePass for DistinctColors {
    fn apply(&self, instance: &str, values: &mut [String]) {
        let mut usage = [0usize; PALETTE.len()];
        let slot = |value: &str| PALETTE.iter().position(|c| *c == value);

        for value in values.iter() {
            if let Some(i) = slot(value.as_str()) {
                usage[i] += 1;
            }
        }

        for value in values.iter_mut().rev() {
            let Some(i) = slot(value.as_str()) else { continue };
            if usage[i] > 1 {
                usage[i] -= 1;
                let replacement = match usage.iter().position(|&n| n == 0) {
                    Some(free) => {
                        usage[free] += 1;
                        PALETTE[free]
                    }
                    None => "",
                };
                debug!(instance, from = %value, to = replacement, "Reassigned duplicate color");
                *value = replacement.to_string();
            }
        }
    }
}
