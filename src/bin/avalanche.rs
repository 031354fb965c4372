use lib::{
    avalanche::{
        compute_avalanche_chart, generate_counting, generate_random, generate_single_1_bit,
    },
    siphash::{self, KEY_SIZE_BYTES},
};

// Fixed key for the message-avalanche targets, and fixed message for the
// key-avalanche target. Arbitrary values; the charts are insensitive to the
// particular choice.
const FIXED_KEY: [u8; KEY_SIZE_BYTES] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
    0x0f,
];
const FIXED_MESSAGE: &[u8] = b"somepseudorandomlygeneratedbytes";

struct Target<'a> {
    name: &'a str,
    digest_function: &'a dyn Fn(&[u8]) -> u64,
    input_size: usize, // In bytes.
}

const TARGETS: &[Target] = &[
    Target {
        name: "message avalanche, single block",
        digest_function: &|message| siphash::hash(&FIXED_KEY, message),
        input_size: 8,
    },
    Target {
        name: "message avalanche, multi block with tail",
        digest_function: &|message| siphash::hash(&FIXED_KEY, message),
        input_size: 21,
    },
    Target {
        name: "key avalanche",
        digest_function: &|key| siphash::hash(key.try_into().unwrap(), FIXED_MESSAGE),
        input_size: KEY_SIZE_BYTES,
    },
];

struct BitPattern<'a> {
    name: &'a str,
    gen_function: &'a dyn Fn(usize, &mut [u8]),

    /// Number of rounds to run the pattern with. Zero is treated specially,
    /// and means to use the bit width of the input.
    rounds: usize,
}

const PATTERNS: &[BitPattern] = &[
    BitPattern {
        name: "random",
        gen_function: &generate_random,
        rounds: 1 << 14,
    },
    BitPattern {
        name: "counting",
        gen_function: &generate_counting,
        rounds: 1 << 14,
    },
    BitPattern {
        name: "single-bit",
        gen_function: &generate_single_1_bit,

        // NOTE: because this test has a small, fixed number of rounds by its
        // nature, the generated statistics should be interpreted a little
        // differently. In particular, even a very good keyed hash is
        // unlikely to achieve "perfect" avalanche by this measure, purely
        // because it's impossible to collect enough samples to reduce
        // variance enough.
        rounds: 0,
    },
];

fn main() {
    let mut name_filters = Vec::new();

    for arg in std::env::args().skip(1) {
        name_filters.push(arg.to_lowercase());
    }

    for target in TARGETS.iter() {
        if !name_filters.is_empty() {
            let lower_name = target.name.to_lowercase();

            if !name_filters
                .iter()
                .any(|filter| lower_name.contains(filter))
            {
                continue;
            }
        }

        println!("\n================================");
        println!("{}", target.name);
        for pattern in PATTERNS.iter() {
            println!("\nInput bit pattern: {}", pattern.name);
            let chart = compute_avalanche_chart(
                pattern.gen_function,
                target.digest_function,
                target.input_size,
                if pattern.rounds == 0 {
                    target.input_size * 8
                } else {
                    pattern.rounds
                },
            );
            chart.print_report();
            chart
                .write_png(&format!("{} - {}.png", target.name, pattern.name))
                .unwrap();
        }
    }
}
