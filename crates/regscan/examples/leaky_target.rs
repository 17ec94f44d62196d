//! Demo target that copies a secret into a CPU register.
//!
//! Build it, then trace it:
//!
//! ```text
//! cargo build --example leaky_target
//! regscan target/debug/examples/leaky_target flag A
//! regscan --exact target/debug/examples/leaky_target flag A
//! ```
//!
//! The value is laid out the way each match mode expects (secret bit `i`
//! at register bit `i + 1`, or at bit `i` with `--exact`), so both runs
//! raise at least one alert for `flag`.

use std::hint::black_box;

/// Place the MSB-first bits of `secret` at register bits starting from `offset`.
fn encode(secret: &[u8], offset: usize) -> u64
{
    secret
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .enumerate()
        .take(64 - offset)
        .filter(|(_, bit)| *bit)
        .fold(0, |acc, (i, _)| acc | (1 << (i + offset)))
}

fn main()
{
    let secret = std::env::var("LEAKY_SECRET").unwrap_or_else(|_| "A".to_string());

    let shifted = black_box(encode(secret.as_bytes(), 1));
    let exact = black_box(encode(secret.as_bytes(), 0));

    println!("leaked {shifted:#x} and {exact:#x}");
}
