//! HTTP clients for the data the live analyzers read: Solana JSON-RPC and DexScreener.

pub mod http;

pub mod dexscreener;
pub mod rpc;

pub use dexscreener::{DexPair, DexScreenerClient, PairToken};
pub use http::{RateLimiter, Transport};
pub use rpc::{MintAccount, MintExtension, SolanaRpcClient, TokenHolder};

pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Cheap shape check for a base58-encoded 32-byte public key.
pub fn is_valid_address(s: &str) -> bool {
    (32..=44).contains(&s.len()) && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_ids_are_addresses() {
        assert!(is_valid_address(TOKEN_PROGRAM_ID));
        assert!(is_valid_address(TOKEN_2022_PROGRAM_ID));
        assert!(is_valid_address("So11111111111111111111111111111111111111112"));
    }

    #[test]
    fn test_rejects_symbols_and_bad_characters() {
        assert!(!is_valid_address("BONK"));
        assert!(!is_valid_address(""));
        // 0, O, I and l are not in the base58 alphabet
        assert!(!is_valid_address("0okenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"));
        assert!(!is_valid_address("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5Dl"));
        assert!(!is_valid_address(&"1".repeat(45)));
    }
}
