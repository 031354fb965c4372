//! Avalanche measurement for the SipHash digest.
//!
//! Flips each input bit in turn and records which of the 64 digest bits
//! change, accumulating flip counts over many sampled inputs. A well-mixed
//! keyed hash should flip each digest bit with probability 1/2 for every
//! input bit, i.e. zero bias.

use std::{fs::File, path::Path};

use nanorand::{Rng, WyRand};

pub const DIGEST_BIT_LEN: usize = 64;

pub struct AvalancheChart {
    pub input_bit_len: usize,

    // The number of samples accumulated.  Or put another way, the number of
    // rounds used to generate the chart.
    pub sample_count: usize,

    // One row per input bit.  Each element is a count of the number of
    // digest-bit flips for that in/out bit pairing.
    pub chart: Vec<[u32; DIGEST_BIT_LEN]>,
}

impl AvalancheChart {
    pub fn new(input_bit_len: usize) -> Self {
        Self {
            input_bit_len: input_bit_len,
            sample_count: 0,
            chart: vec![[0; DIGEST_BIT_LEN]; input_bit_len],
        }
    }

    /// Records the digest difference (xor of the untweaked and tweaked
    /// digests) observed when input bit `in_bit` was flipped.
    pub fn accumulate(&mut self, in_bit: usize, digest_diff: u64) {
        let row = &mut self.chart[in_bit];
        for out_bit in 0..DIGEST_BIT_LEN {
            row[out_bit] += ((digest_diff >> out_bit) & 1) as u32;
        }
    }

    pub fn get(&self, in_bit: usize, out_bit: usize) -> u32 {
        self.chart[in_bit][out_bit]
    }

    pub fn row_diffusion(&self, in_bit: usize) -> f64 {
        let norm = 1.0 / self.sample_count as f64;
        self.chart[in_bit]
            .iter()
            .map(|&flips| 1.0 - p_to_bias(flips as f64 * norm))
            .sum()
    }

    pub fn row_entropy(&self, in_bit: usize) -> f64 {
        let norm = 1.0 / self.sample_count as f64;
        self.chart[in_bit]
            .iter()
            .map(|&flips| p_to_entropy(flips as f64 * norm))
            .sum()
    }

    pub fn average_bias(&self) -> f64 {
        let norm = 1.0 / self.sample_count as f64;

        let bias_sum: f64 = self
            .chart
            .iter()
            .flatten()
            .map(|&flips| p_to_bias(flips as f64 * norm))
            .sum();
        bias_sum / (self.input_bit_len * DIGEST_BIT_LEN) as f64
    }

    pub fn max_bias(&self) -> f64 {
        let norm = 1.0 / self.sample_count as f64;

        let mut max_bias = 0.0f64;
        for &flips in self.chart.iter().flatten() {
            max_bias = max_bias.max(p_to_bias(flips as f64 * norm));
        }
        max_bias
    }

    pub fn min_input_bit_diffusion(&self) -> f64 {
        let mut min_diffusion = f64::INFINITY;
        for i in 0..self.input_bit_len {
            min_diffusion = min_diffusion.min(self.row_diffusion(i));
        }
        min_diffusion
    }

    pub fn avg_input_bit_diffusion(&self) -> f64 {
        let mut avg_diffusion = 0.0f64;
        for i in 0..self.input_bit_len {
            avg_diffusion += self.row_diffusion(i);
        }
        avg_diffusion / self.input_bit_len as f64
    }

    pub fn min_input_bit_entropy(&self) -> f64 {
        let mut min_entropy = f64::INFINITY;
        for i in 0..self.input_bit_len {
            min_entropy = min_entropy.min(self.row_entropy(i));
        }
        min_entropy
    }

    pub fn avg_input_bit_entropy(&self) -> f64 {
        let mut avg_entropy = 0.0f64;
        for i in 0..self.input_bit_len {
            avg_entropy += self.row_entropy(i);
        }
        avg_entropy / self.input_bit_len as f64
    }

    pub fn print_report(&self) {
        println!(
            "    Bias:
        Avg: {:0.4}
        Max: {:0.4}
    Input Bit Diffusion (digest size = {} bits):
        Min: {:0.1} bits
        Avg: {:0.1} bits
    Input Bit Diffusion Entropy (digest size = {} bits):
        Min: {:0.1} bits
        Avg: {:0.1} bits",
            self.average_bias(),
            self.max_bias(),
            DIGEST_BIT_LEN,
            self.min_input_bit_diffusion(),
            self.avg_input_bit_diffusion(),
            DIGEST_BIT_LEN,
            self.min_input_bit_entropy(),
            self.avg_input_bit_entropy(),
        );
    }

    /// Writes the chart as a grayscale PNG, one row of pixels per input bit,
    /// one column per digest bit. A flip probability of 1/2 renders as
    /// middle gray.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut pixels = Vec::new();

        for &flips in self.chart.iter().flatten() {
            let v = (flips * 255 / self.sample_count as u32).min(255) as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }

        png_encode_mini::write_rgba_from_u8(
            &mut File::create(path.as_ref())?,
            &pixels,
            DIGEST_BIT_LEN as u32,
            self.input_bit_len as u32,
        )?;

        Ok(())
    }
}

/// Computes an avalanche chart for a digest function, using a provided
/// input generator.
///
/// - `generate_input`: function that takes a seed and generates an input
///   buffer.  The result should be deterministic based on the seed.  Note
///   that the seed starts from zero, and simply increments each round.
/// - `digest`: the function under measurement, mapping an input buffer to
///   a 64-bit digest.
/// - `input_size`: size of `digest`'s input, in bytes.
/// - `rounds`: how many test rounds to perform to produce the estimated
///   chart.
pub fn compute_avalanche_chart<F1, F2>(
    generate_input: F1,
    digest: F2,
    input_size: usize,
    rounds: usize,
) -> AvalancheChart
where
    F1: Fn(usize, &mut [u8]),
    F2: Fn(&[u8]) -> u64,
{
    let mut chart = AvalancheChart::new(input_size * 8);

    let mut input = vec![0u8; input_size];
    let mut input_tweaked = vec![0u8; input_size];

    for round in 0..rounds {
        generate_input(round, &mut input[..]);

        let base = digest(&input[..]);
        for in_bit_idx in 0..(input_size * 8) {
            input_tweaked.copy_from_slice(&input[..]);
            input_tweaked[in_bit_idx / 8] ^= 1 << (in_bit_idx % 8);

            chart.accumulate(in_bit_idx, base ^ digest(&input_tweaked[..]));
        }

        chart.sample_count += 1;
    }

    chart
}

pub fn p_to_bias(p: f64) -> f64 {
    (p * 2.0 - 1.0).abs()
}

pub fn p_to_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        0.0
    } else {
        let q = 1.0 - p;
        -(p * p.log2()) - (q * q.log2())
    }
}

//-------------------------------------------------------------

/// Generates a random byte stream.
pub fn generate_random(seed: usize, bytes: &mut [u8]) {
    let mut rng = WyRand::new_seed(mix64(seed as u64));
    rng.fill_bytes(bytes);
}

/// Generates a byte stream with all zero bits except one.
pub fn generate_single_1_bit(seed: usize, bytes: &mut [u8]) {
    let bit_idx = seed % (bytes.len() * 8);
    let i = bit_idx / 8;
    let byte = 1 << (bit_idx % 8);
    bytes.fill(0);
    bytes[i] = byte;
}

/// Generates a byte stream with the lowest bits simply counting up as an
/// incrementing integer.
pub fn generate_counting(seed: usize, bytes: &mut [u8]) {
    bytes[0..8].copy_from_slice(&u64::to_le_bytes(seed as u64));
    bytes[8..].fill(0);
}

/// 64-bit bijective bit mixer.
fn mix64(mut n: u64) -> u64 {
    // Break zero sensitivity.
    n ^= 0x7be355f7c2e736d2;

    // http://zimbry.blogspot.ch/2011/09/better-bit-mixing-improving-on.html
    // (variant "Mix13")
    n ^= n >> 30;
    n = n.wrapping_mul(0xbf58476d1ce4e5b9);
    n ^= n >> 27;
    n = n.wrapping_mul(0x94d049bb133111eb);
    n ^= n >> 31;

    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_counts_flips() {
        // A digest that copies the first input byte flips exactly the bit
        // that was tweaked, for input bits 0-7, and nothing for the rest.
        let chart = compute_avalanche_chart(
            generate_random,
            |bytes: &[u8]| bytes[0] as u64,
            2,
            10,
        );

        assert_eq!(chart.sample_count, 10);
        for in_bit in 0..8 {
            for out_bit in 0..DIGEST_BIT_LEN {
                let expected = if in_bit == out_bit { 10 } else { 0 };
                assert_eq!(chart.get(in_bit, out_bit), expected);
            }
        }
        for in_bit in 8..16 {
            assert_eq!(chart.row_diffusion(in_bit), 0.0);
        }
    }

    #[test]
    fn siphash_diffuses_message_bits() {
        let key = [0x42u8; crate::siphash::KEY_SIZE_BYTES];
        let chart = compute_avalanche_chart(
            generate_random,
            |message: &[u8]| crate::siphash::hash(&key, message),
            16,
            128,
        );

        // With 128 samples the flip probability for every in/out pairing
        // should sit near 1/2; a bias of 1.0 would mean a digest bit that
        // never (or always) flips.
        assert!(chart.max_bias() < 0.9);
        assert!(chart.avg_input_bit_diffusion() > DIGEST_BIT_LEN as f64 * 0.8);
    }
}
