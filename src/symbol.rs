//! Fresh, process-unique identifier strings (spec.md §4.1).

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// `<prefix><instance-seed><counter>`, each component base-36 for
/// compactness. Two generators constructed independently — even in the
/// same process — will not collide with overwhelming probability: the
/// seed mixes a wall-clock sample with one `ThreadRng` draw taken once
/// at construction.
#[derive(Debug)]
pub struct SymbolGenerator {
    prefix: String,
    seed: String,
    counter: u64,
}

impl SymbolGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
        let entropy: u64 = rand::thread_rng().gen();
        let seed = to_base36(nanos as u64 ^ entropy);
        SymbolGenerator { prefix: prefix.into(), seed, counter: 0 }
    }

    /// Returns a new unique string on every call.
    pub fn fresh(&mut self) -> String {
        let n = self.counter;
        self.counter += 1;
        format!("{}{}{}", self.prefix, self.seed, to_base36(n))
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).expect("base-36 digits are ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_calls_are_distinct() {
        let mut gen = SymbolGenerator::new("g");
        let a = gen.fresh();
        let b = gen.fresh();
        assert_ne!(a, b);
        assert!(a.starts_with('g'));
    }

    #[test]
    fn independent_generators_do_not_collide() {
        let mut a = SymbolGenerator::new("g");
        let mut b = SymbolGenerator::new("g");
        let syms_a: Vec<_> = (0..8).map(|_| a.fresh()).collect();
        let syms_b: Vec<_> = (0..8).map(|_| b.fresh()).collect();
        for s in &syms_a {
            assert!(!syms_b.contains(s));
        }
    }
}
