===== src/config.rs =====
//! Parser configuration: the enumerated options of spec §6.

/// Tunables for a parse. `Default` matches the reference implementation's
/// defaults: 8-bit key lengths, 16-bit value lengths, 16-bit child counts,
/// SIMD enabled, strict RFC 8259 numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Store tokens packed (bit-width-limited fields) rather than in a
    /// naturally aligned layout. Packing is the only representation this
    /// crate implements in-memory; the flag is kept for interface parity
    /// with the reference implementation and governs only the *binary*
    /// codec's use of the narrow widths below.
    pub dont_pack_tokens: bool,
    /// Skip key/value/child overflow checks. Only safe for trusted input.
    pub dont_check_overflow: bool,
    /// Bits available for a key length (default 8: max key length 255).
    pub key_length_width: u32,
    /// Bits available for a value length (default 16).
    pub value_length_width: u32,
    /// Bits available for a child count (default 16).
    pub children_width: u32,
    /// Force the scalar fallback of the SIMD scanners.
    pub dont_use_simd: bool,
    /// Assert the source has no insignificant whitespace between tokens.
    pub despaced_input: bool,
    /// Accept a `0x`-prefixed hex number extension (non-conformant with
    /// RFC 8259). Off by default; see spec §9's open question.
    pub hex_numbers: bool,
    /// Maximum container nesting depth. `None` disables the check, which
    /// reintroduces the reference implementation's unbounded-recursion
    /// issue (spec §9) — use only for trusted input.
    pub max_depth: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dont_pack_tokens: false,
            dont_check_overflow: false,
            key_length_width: 8,
            value_length_width: 16,
            children_width: 16,
            dont_use_simd: false,
            despaced_input: false,
            hex_numbers: false,
            max_depth: Some(512),
        }
    }
}

impl Config {
    pub fn max_key_len(&self) -> u64 {
        (1u64 << self.key_length_width) - 1
    }

    pub fn max_value_len(&self) -> u64 {
        (1u64 << self.value_length_width) - 1
    }

    pub fn max_childs(&self) -> u64 {
        (1u64 << self.children_width) - 1
    }

    pub fn with_despaced_input(mut self, despaced: bool) -> Self {
        self.despaced_input = despaced;
        self
    }

    pub fn with_hex_numbers(mut self, allow: bool) -> Self {
        self.hex_numbers = allow;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_simd(mut self, use_simd: bool) -> Self {
        self.dont_use_simd = !use_simd;
        self
    }
}
